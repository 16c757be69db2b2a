use crate::api::CatalogApi;
use crate::config::JobConfig;
use crate::error::JanitorError;
use crate::stages::{self, DeleteMode, LineagePolicy};
use crate::store::SnapshotStore;
use crate::types::{DeletionSummary, LineageReport, SchemaListing, Table};
use chrono::Utc;
use tracing::info;

/// Runs the stages against a catalog, reading and writing snapshots in `store`.
///
/// Each stage only reads the snapshot of the stage before it, so any stage can
/// be re-run on its own.
pub struct Pipeline<'a, C> {
    catalog: &'a C,
    store: &'a SnapshotStore,
    job: &'a JobConfig,
}

impl<'a, C: CatalogApi> Pipeline<'a, C> {
    pub fn new(catalog: &'a C, store: &'a SnapshotStore, job: &'a JobConfig) -> Self {
        Self {
            catalog,
            store,
            job,
        }
    }

    pub async fn fetch_schemas(&self) -> Result<SchemaListing, JanitorError> {
        let schemas =
            stages::fetch_schemas(self.catalog, &self.job.database, self.job.page_size).await?;
        let listing = SchemaListing {
            database: self.job.database.clone(),
            fetched_at: Utc::now(),
            data: schemas,
        };
        let path = self.store.write_schemas(&listing)?;
        info!(path = %path.display(), "stage 1 complete");
        Ok(listing)
    }

    pub async fn collect_tables(&self) -> Result<usize, JanitorError> {
        let listing = self.store.read_schemas()?;
        let collected =
            stages::collect_tables(self.catalog, &listing.data, self.job.page_size).await?;
        // A schema skipped in this run must not keep its snapshot from the last one.
        self.store.clear_tables()?;
        let mut total = 0;
        for tables in &collected {
            self.store.write_tables(tables)?;
            total += tables.data.len();
        }
        info!(
            path = %self.store.tables_dir().display(),
            schemas = collected.len(),
            tables = total,
            "stage 2 complete"
        );
        Ok(total)
    }

    pub async fn extract_lineage(&self) -> Result<LineageReport, JanitorError> {
        let listing = self.store.read_schemas()?;
        let tables: Vec<Table> = self
            .store
            .read_tables(&listing)?
            .into_iter()
            .flat_map(|s| s.data)
            .collect();
        let policy = LineagePolicy::from_job(self.job);
        let report = stages::extract_lineage(self.catalog, &tables, &policy).await?;
        let path = self.store.write_lineage(&report)?;
        info!(path = %path.display(), edges = report.edges.len(), "stage 3 complete");
        Ok(report)
    }

    pub async fn delete_lineage(&self, mode: DeleteMode) -> Result<DeletionSummary, JanitorError> {
        let report = self.store.read_lineage()?;
        let summary = stages::delete_lineage(self.catalog, &report, mode).await?;
        let path = self.store.write_deletions(&summary)?;
        info!(path = %path.display(), "stage 4 complete");
        Ok(summary)
    }

    pub async fn run_all(&self, mode: DeleteMode) -> Result<DeletionSummary, JanitorError> {
        self.fetch_schemas().await?;
        self.collect_tables().await?;
        self.extract_lineage().await?;
        self.delete_lineage(mode).await
    }
}
