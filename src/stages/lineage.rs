use crate::api::CatalogApi;
use crate::config::JobConfig;
use crate::error::JanitorError;
use crate::types::{
    EntityLineage, EntityRef, LineageEdge, LineageReport, RawEdge, Table, TableLineage,
};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Which tables are swept and which of their edges are removed.
#[derive(Debug, Clone)]
pub struct LineagePolicy {
    pub depth: u32,
    pub table_types: Vec<String>,
    pub exclude_name_pattern: Option<String>,
    pub keep_detailed_edges: bool,
}

impl Default for LineagePolicy {
    fn default() -> Self {
        Self::from_job(&JobConfig::default())
    }
}

impl LineagePolicy {
    pub fn from_job(job: &JobConfig) -> Self {
        Self {
            depth: job.lineage_depth,
            table_types: job.table_types.clone(),
            exclude_name_pattern: job
                .exclude_name_pattern
                .as_ref()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty()),
            keep_detailed_edges: job.keep_detailed_edges,
        }
    }

    pub fn admits_table(&self, table: &Table) -> bool {
        table.table_type.as_deref().is_some_and(|ty| {
            self.table_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ty))
        })
    }

    fn is_excluded_name(&self, entity: &EntityRef) -> bool {
        self.exclude_name_pattern.as_deref().is_some_and(|pattern| {
            entity
                .fully_qualified_name
                .to_lowercase()
                .contains(pattern)
        })
    }

    /// An edge is removed unless it is documented by lineage details (when those
    /// are kept) or either endpoint matches the exclude pattern.
    pub fn is_candidate(&self, edge: &LineageEdge) -> bool {
        if self.keep_detailed_edges && edge.lineage_details.is_some() {
            return false;
        }
        !(self.is_excluded_name(&edge.from) || self.is_excluded_name(&edge.to))
    }
}

/// Query lineage for every admitted table and build the cleanup report.
///
/// Only edges incident to a swept table are considered. Edges are directed and
/// deduplicated on `(from, to)`; the first occurrence keeps its metadata. A
/// table whose lineage cannot be fetched is skipped unless the failure is fatal.
pub async fn extract_lineage<C: CatalogApi>(
    catalog: &C,
    tables: &[Table],
    policy: &LineagePolicy,
) -> Result<LineageReport, JanitorError> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut edges = Vec::new();
    let mut adjacency = Vec::new();

    for table in tables {
        if !policy.admits_table(table) {
            debug!(
                table = %table.fully_qualified_name,
                table_type = ?table.table_type,
                "table type not swept"
            );
            continue;
        }

        let lineage = match catalog.get_lineage(&table.id, policy.depth).await {
            Ok(lineage) => lineage,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(table = %table.fully_qualified_name, error = %e, "skipping lineage");
                continue;
            }
        };

        let incident = incident_edges(&lineage, &table.id);
        adjacency.push(table_adjacency(table, &lineage, &incident));

        let mut selected = 0usize;
        for edge in incident {
            if !policy.is_candidate(&edge) {
                debug!(
                    from = %edge.from.fully_qualified_name,
                    to = %edge.to.fully_qualified_name,
                    "edge kept by policy"
                );
                continue;
            }
            if seen.insert((edge.from.id.clone(), edge.to.id.clone())) {
                selected += 1;
                edges.push(edge);
            }
        }
        debug!(table = %table.fully_qualified_name, selected, "lineage inspected");
    }

    info!(
        tables = adjacency.len(),
        edges = edges.len(),
        "lineage extracted"
    );
    Ok(LineageReport {
        generated_at: Utc::now(),
        depth: policy.depth,
        tables: adjacency,
        edges,
    })
}

fn incident_edges(lineage: &EntityLineage, root_id: &str) -> Vec<LineageEdge> {
    lineage
        .upstream_edges
        .iter()
        .chain(lineage.downstream_edges.iter())
        .filter(|raw| raw.from_entity == root_id || raw.to_entity == root_id)
        .map(|raw| to_edge(lineage, raw))
        .collect()
}

fn to_edge(lineage: &EntityLineage, raw: &RawEdge) -> LineageEdge {
    LineageEdge {
        from: lineage.resolve(&raw.from_entity),
        to: lineage.resolve(&raw.to_entity),
        lineage_details: raw.lineage_details.clone(),
    }
}

fn table_adjacency(table: &Table, lineage: &EntityLineage, incident: &[LineageEdge]) -> TableLineage {
    let mut upstream: Vec<EntityRef> = Vec::new();
    let mut downstream: Vec<EntityRef> = Vec::new();
    for edge in incident {
        if edge.to.id == table.id && !upstream.iter().any(|r| r.id == edge.from.id) {
            upstream.push(edge.from.clone());
        }
        if edge.from.id == table.id && !downstream.iter().any(|r| r.id == edge.to.id) {
            downstream.push(edge.to.clone());
        }
    }
    let root = if lineage.entity.id == table.id {
        lineage.entity.clone()
    } else {
        table.entity_ref()
    };
    TableLineage {
        table: root,
        upstream,
        downstream,
    }
}
