//! Snapshot documents written between stages.
//!
//! All of them are pretty-printed JSON so an operator can review what stage 4
//! is about to delete.

use super::catalog::{EntityRef, Schema, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of the schema fetcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaListing {
    pub database: String,
    pub fetched_at: DateTime<Utc>,
    pub data: Vec<Schema>,
}

/// Table details for one schema; one snapshot file per schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTables {
    pub schema: String,
    pub data: Vec<Table>,
}

/// A directed lineage edge. Identity is the `(from.id, to.id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    pub from: EntityRef,
    pub to: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_details: Option<Value>,
}

impl LineageEdge {
    pub fn key(&self) -> (&str, &str) {
        (self.from.id.as_str(), self.to.id.as_str())
    }

    pub fn is_self_loop(&self) -> bool {
        self.from.id == self.to.id
    }
}

/// Directly connected tables of one swept table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableLineage {
    pub table: EntityRef,
    pub upstream: Vec<EntityRef>,
    pub downstream: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineageReport {
    pub generated_at: DateTime<Utc>,
    pub depth: u32,
    pub tables: Vec<TableLineage>,
    /// Deduplicated edges selected for deletion.
    pub edges: Vec<LineageEdge>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeletionStatus {
    Deleted,
    AlreadyAbsent,
    SkippedDryRun,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRecord {
    pub from: EntityRef,
    pub to: EntityRef,
    pub status: DeletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeletionCounts {
    pub deleted: usize,
    pub already_absent: usize,
    pub skipped_dry_run: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSummary {
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub counts: DeletionCounts,
    pub results: Vec<DeletionRecord>,
}

impl DeletionSummary {
    pub fn new(dry_run: bool, results: Vec<DeletionRecord>) -> Self {
        let counts = results
            .iter()
            .fold(DeletionCounts::default(), |mut acc, r| {
                match r.status {
                    DeletionStatus::Deleted => acc.deleted += 1,
                    DeletionStatus::AlreadyAbsent => acc.already_absent += 1,
                    DeletionStatus::SkippedDryRun => acc.skipped_dry_run += 1,
                    DeletionStatus::Failed => acc.failed += 1,
                }
                acc
            });
        Self {
            finished_at: Utc::now(),
            dry_run,
            counts,
            results,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
    }
}
