use crate::api::{CatalogApi, collect_pages};
use crate::error::JanitorError;
use crate::types::Schema;
use std::collections::HashSet;
use tracing::{info, warn};

/// List every schema of `database`, following pagination to the end.
///
/// Any failure aborts: later stages need the complete listing.
pub async fn fetch_schemas<C: CatalogApi>(
    catalog: &C,
    database: &str,
    page_size: u32,
) -> Result<Vec<Schema>, JanitorError> {
    info!(database, page_size, "fetching schemas");

    let fetched = collect_pages(move |after| async move {
        catalog
            .list_schemas(database, page_size, after.as_deref())
            .await
    })
    .await?;

    let total = fetched.len();
    let mut seen = HashSet::with_capacity(total);
    let schemas: Vec<Schema> = fetched
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect();

    if schemas.len() < total {
        warn!(
            database,
            dropped = total - schemas.len(),
            "catalog returned duplicate schemas across pages"
        );
    }
    info!(database, count = schemas.len(), "schemas fetched");
    Ok(schemas)
}
