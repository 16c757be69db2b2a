#![allow(dead_code)]

use lineage_janitor::types::{
    EntityLineage, EntityRef, Page, Paging, RawEdge, Schema, Table, TableSummary,
};
use lineage_janitor::{CatalogApi, DeleteOutcome, JanitorError};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MockEdge {
    pub from: String,
    pub to: String,
    pub details: Option<Value>,
}

/// In-memory catalog with cursor pagination and a live, mutable edge set.
#[derive(Default)]
pub struct MockCatalog {
    pub database: String,
    pub schemas: Vec<Schema>,
    pub tables: HashMap<String, Vec<Table>>,
    /// Ids listed by the table endpoint whose detail call returns 404.
    pub vanished_tables: HashSet<String>,
    /// Ids whose lineage payload is malformed.
    pub broken_lineage: HashSet<String>,
    /// Ids whose lineage call fails with a server error.
    pub failing_lineage: HashSet<String>,
    /// Pairs whose delete call fails with a server error.
    pub failing_deletes: HashSet<(String, String)>,
    pub reject_token: bool,
    pub edges: Mutex<Vec<MockEdge>>,
    pub list_schema_calls: Mutex<usize>,
    pub lineage_calls: Mutex<Vec<String>>,
    pub delete_calls: Mutex<Vec<(String, String)>>,
}

pub fn schema(id: &str, fqn: &str) -> Schema {
    Schema {
        id: id.to_string(),
        fully_qualified_name: fqn.to_string(),
        database: Some(EntityRef {
            id: "db-1".to_string(),
            entity_type: "database".to_string(),
            fully_qualified_name: "svc.shop".to_string(),
        }),
    }
}

pub fn table(id: &str, fqn: &str, table_type: &str) -> Table {
    Table {
        id: id.to_string(),
        fully_qualified_name: fqn.to_string(),
        database_schema: None,
        table_type: Some(table_type.to_string()),
        href: Some(format!("http://catalog/api/v1/tables/{id}")),
        columns: vec![],
    }
}

fn paginate<T: Clone>(items: &[T], limit: u32, after: Option<&str>) -> Page<T> {
    let start: usize = after.map(|c| c.parse().expect("mock cursor")).unwrap_or(0);
    let end = (start + limit as usize).min(items.len());
    Page {
        data: items[start..end].to_vec(),
        paging: Paging {
            after: (end < items.len()).then(|| end.to_string()),
            total: Some(items.len() as u64),
        },
    }
}

impl MockCatalog {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            ..Self::default()
        }
    }

    /// `sales` with `orders` and `customers`, plus the edge `orders -> customers`.
    pub fn sales() -> Self {
        let mut catalog = Self::new("svc.shop");
        catalog.add_schema(schema("s-sales", "svc.shop.sales"));
        catalog.add_table("svc.shop.sales", table("orders", "svc.shop.sales.orders", "Regular"));
        catalog.add_table(
            "svc.shop.sales",
            table("customers", "svc.shop.sales.customers", "Regular"),
        );
        catalog.add_edge("orders", "customers", None);
        catalog
    }

    pub fn add_schema(&mut self, schema: Schema) {
        self.schemas.push(schema);
    }

    pub fn add_table(&mut self, schema_fqn: &str, table: Table) {
        self.tables
            .entry(schema_fqn.to_string())
            .or_default()
            .push(table);
    }

    pub fn add_edge(&self, from: &str, to: &str, details: Option<Value>) {
        self.edges.lock().unwrap().push(MockEdge {
            from: from.to_string(),
            to: to.to_string(),
            details,
        });
    }

    pub fn edge_count(&self) -> usize {
        self.edges.lock().unwrap().len()
    }

    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.delete_calls.lock().unwrap().clone()
    }

    fn check_token(&self) -> Result<(), JanitorError> {
        if self.reject_token {
            return Err(JanitorError::Auth(StatusCode::UNAUTHORIZED));
        }
        Ok(())
    }

    fn all_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values().flatten()
    }

    fn entity_ref(&self, id: &str) -> EntityRef {
        self.all_tables()
            .find(|t| t.id == id)
            .map(Table::entity_ref)
            .unwrap_or_else(|| EntityRef::table(id, ""))
    }
}

impl CatalogApi for MockCatalog {
    async fn list_schemas(
        &self,
        database: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<Page<Schema>, JanitorError> {
        self.check_token()?;
        *self.list_schema_calls.lock().unwrap() += 1;
        if database != self.database {
            return Err(JanitorError::NotFound(format!("database {database}")));
        }
        Ok(paginate(&self.schemas, limit, after))
    }

    async fn list_tables(
        &self,
        schema_fqn: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<Page<TableSummary>, JanitorError> {
        self.check_token()?;
        let tables = self
            .tables
            .get(schema_fqn)
            .ok_or_else(|| JanitorError::NotFound(format!("schema {schema_fqn}")))?;
        let summaries: Vec<TableSummary> = tables
            .iter()
            .map(|t| TableSummary {
                id: t.id.clone(),
                fully_qualified_name: t.fully_qualified_name.clone(),
            })
            .collect();
        Ok(paginate(&summaries, limit, after))
    }

    async fn get_table(&self, id: &str) -> Result<Table, JanitorError> {
        self.check_token()?;
        if self.vanished_tables.contains(id) {
            return Err(JanitorError::NotFound(format!("table {id}")));
        }
        self.all_tables()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| JanitorError::NotFound(format!("table {id}")))
    }

    async fn get_lineage(&self, id: &str, _depth: u32) -> Result<EntityLineage, JanitorError> {
        self.check_token()?;
        self.lineage_calls.lock().unwrap().push(id.to_string());
        if self.failing_lineage.contains(id) {
            return Err(JanitorError::UpstreamStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }
        if self.broken_lineage.contains(id) {
            return Err(JanitorError::UnexpectedResponse(format!(
                "lineage of table {id}: missing field `entity`"
            )));
        }

        let edges = self.edges.lock().unwrap();
        let raw = |e: &MockEdge| RawEdge {
            from_entity: e.from.clone(),
            to_entity: e.to.clone(),
            lineage_details: e.details.clone(),
        };
        let upstream_edges: Vec<RawEdge> = edges.iter().filter(|e| e.to == id).map(raw).collect();
        let downstream_edges: Vec<RawEdge> =
            edges.iter().filter(|e| e.from == id).map(raw).collect();

        let mut node_ids: Vec<&str> = Vec::new();
        for e in upstream_edges.iter().chain(downstream_edges.iter()) {
            for n in [e.from_entity.as_str(), e.to_entity.as_str()] {
                if n != id && !node_ids.contains(&n) {
                    node_ids.push(n);
                }
            }
        }
        let nodes = node_ids.iter().map(|n| self.entity_ref(n)).collect();

        Ok(EntityLineage {
            entity: self.entity_ref(id),
            nodes,
            upstream_edges,
            downstream_edges,
        })
    }

    async fn delete_edge(&self, from_id: &str, to_id: &str) -> Result<DeleteOutcome, JanitorError> {
        self.check_token()?;
        self.delete_calls
            .lock()
            .unwrap()
            .push((from_id.to_string(), to_id.to_string()));
        if self
            .failing_deletes
            .contains(&(from_id.to_string(), to_id.to_string()))
        {
            return Err(JanitorError::UpstreamStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }

        let mut edges = self.edges.lock().unwrap();
        let before = edges.len();
        edges.retain(|e| !(e.from == from_id && e.to == to_id));
        if edges.len() < before {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
