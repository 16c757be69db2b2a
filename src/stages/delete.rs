use crate::api::{CatalogApi, DeleteOutcome};
use crate::error::JanitorError;
use crate::types::{DeletionRecord, DeletionStatus, DeletionSummary, LineageReport};
use std::collections::HashSet;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Log the pairs that would be deleted; the catalog is not touched.
    DryRun,
    Execute,
}

impl DeleteMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Execute }
    }

    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

/// Delete every edge of the report.
///
/// A missing edge counts as deleted, so the run is idempotent. Other failures
/// are recorded and the run continues, except auth and exhausted rate limits,
/// which abort.
pub async fn delete_lineage<C: CatalogApi>(
    catalog: &C,
    report: &LineageReport,
    mode: DeleteMode,
) -> Result<DeletionSummary, JanitorError> {
    info!(edges = report.edges.len(), dry_run = mode.is_dry_run(), "deleting lineage");

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(report.edges.len());

    for edge in &report.edges {
        // The report is operator-editable; a repeated pair is deleted once.
        if !seen.insert(edge.key()) {
            continue;
        }
        let from = edge.from.fully_qualified_name.as_str();
        let to = edge.to.fully_qualified_name.as_str();

        let (status, err) = match mode {
            DeleteMode::DryRun => {
                info!(from, to, "dry run: would delete lineage edge");
                (DeletionStatus::SkippedDryRun, None)
            }
            DeleteMode::Execute => match catalog.delete_edge(&edge.from.id, &edge.to.id).await {
                Ok(DeleteOutcome::Deleted) => {
                    info!(from, to, "lineage edge deleted");
                    (DeletionStatus::Deleted, None)
                }
                Ok(DeleteOutcome::NotFound) | Err(JanitorError::NotFound(_)) => {
                    info!(from, to, "lineage edge already absent");
                    (DeletionStatus::AlreadyAbsent, None)
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(
                        from,
                        to,
                        from_id = %edge.from.id,
                        to_id = %edge.to.id,
                        error = %e,
                        "failed to delete lineage edge"
                    );
                    (DeletionStatus::Failed, Some(e.to_string()))
                }
            },
        };

        results.push(DeletionRecord {
            from: edge.from.clone(),
            to: edge.to.clone(),
            status,
            error: err,
        });
    }

    let summary = DeletionSummary::new(mode.is_dry_run(), results);
    info!(
        deleted = summary.counts.deleted,
        already_absent = summary.counts.already_absent,
        skipped = summary.counts.skipped_dry_run,
        failed = summary.counts.failed,
        "lineage deletion finished"
    );
    Ok(summary)
}
