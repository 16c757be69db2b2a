use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to another catalog entity, as embedded in list and lineage payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub fully_qualified_name: String,
}

impl EntityRef {
    pub fn table(id: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: "table".to_string(),
            fully_qualified_name: fqn.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    pub fully_qualified_name: String,
    #[serde(default)]
    pub database: Option<EntityRef>,
}

/// Row of the table listing endpoint; just enough to fetch the detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: String,
    pub fully_qualified_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub fully_qualified_name: String,
    #[serde(default)]
    pub database_schema: Option<EntityRef>,
    #[serde(default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::table(self.id.clone(), self.fully_qualified_name.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One page of a cursor-paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Paging,
}

impl<T> Page<T> {
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging.after.as_deref().filter(|c| !c.is_empty())
    }
}

/// Raw edge as the lineage endpoint reports it; endpoints are entity ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub from_entity: String,
    pub to_entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_details: Option<Value>,
}

/// Response of `GET /lineage/table/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityLineage {
    pub entity: EntityRef,
    #[serde(default)]
    pub nodes: Vec<EntityRef>,
    #[serde(default)]
    pub upstream_edges: Vec<RawEdge>,
    #[serde(default)]
    pub downstream_edges: Vec<RawEdge>,
}

impl EntityLineage {
    /// Resolve an entity id against the root entity and the node list.
    pub fn resolve(&self, id: &str) -> EntityRef {
        if self.entity.id == id {
            return self.entity.clone();
        }
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .unwrap_or_else(|| EntityRef {
                id: id.to_string(),
                entity_type: "table".to_string(),
                fully_qualified_name: String::new(),
            })
    }
}
