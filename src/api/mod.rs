pub mod openmetadata;

use crate::error::JanitorError;
use crate::types::{EntityLineage, Page, Schema, Table, TableSummary};
use std::collections::HashSet;
use std::future::Future;

pub use openmetadata::OpenMetadataApi;

/// Result of a lineage edge delete call. Deleting a missing edge is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The catalog operations the pipeline needs.
///
/// Implemented over HTTP by [`OpenMetadataApi`]; tests provide an in-memory
/// catalog.
pub trait CatalogApi {
    fn list_schemas(
        &self,
        database: &str,
        limit: u32,
        after: Option<&str>,
    ) -> impl Future<Output = Result<Page<Schema>, JanitorError>>;

    fn list_tables(
        &self,
        schema_fqn: &str,
        limit: u32,
        after: Option<&str>,
    ) -> impl Future<Output = Result<Page<TableSummary>, JanitorError>>;

    fn get_table(&self, id: &str) -> impl Future<Output = Result<Table, JanitorError>>;

    fn get_lineage(
        &self,
        id: &str,
        depth: u32,
    ) -> impl Future<Output = Result<EntityLineage, JanitorError>>;

    fn delete_edge(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> impl Future<Output = Result<DeleteOutcome, JanitorError>>;
}

/// Drain a cursor-paginated endpoint, following `paging.after` until absent.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, JanitorError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, JanitorError>>,
{
    let mut items = Vec::new();
    let mut seen_cursors = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.take()).await?;
        let next = page.next_cursor().map(str::to_string);
        items.extend(page.data);

        match next {
            Some(c) if !seen_cursors.insert(c.clone()) => {
                return Err(JanitorError::UnexpectedResponse(format!(
                    "pagination cursor {c} repeated"
                )));
            }
            Some(c) => cursor = Some(c),
            None => break,
        }
    }
    Ok(items)
}
