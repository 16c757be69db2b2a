use crate::api::{CatalogApi, collect_pages};
use crate::error::JanitorError;
use crate::types::{Schema, SchemaTables};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Fetch the full detail of every table in `schemas`.
///
/// Each table id appears once across the result. Missing schemas or tables and
/// undecodable payloads are skipped with a warning; auth and rate-limit
/// failures abort.
pub async fn collect_tables<C: CatalogApi>(
    catalog: &C,
    schemas: &[Schema],
    page_size: u32,
) -> Result<Vec<SchemaTables>, JanitorError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut collected = Vec::with_capacity(schemas.len());

    for schema in schemas {
        let fqn = schema.fully_qualified_name.as_str();

        let summaries = match collect_pages(move |after| async move {
            catalog.list_tables(fqn, page_size, after.as_deref()).await
        })
        .await
        {
            Ok(summaries) => summaries,
            Err(e) if e.is_skippable() => {
                warn!(schema = %fqn, error = %e, "cannot list tables; skipping schema");
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut tables = Vec::with_capacity(summaries.len());
        for summary in summaries {
            if !seen.insert(summary.id.clone()) {
                debug!(table = %summary.fully_qualified_name, "table already collected");
                continue;
            }
            match catalog.get_table(&summary.id).await {
                Ok(table) => tables.push(table),
                Err(e) if e.is_skippable() => {
                    warn!(
                        table = %summary.fully_qualified_name,
                        id = %summary.id,
                        error = %e,
                        "skipping table"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        info!(schema = %fqn, count = tables.len(), "tables collected");
        collected.push(SchemaTables {
            schema: fqn.to_string(),
            data: tables,
        });
    }

    Ok(collected)
}
