pub mod catalog;
pub mod report;

pub use catalog::{EntityLineage, EntityRef, Page, Paging, RawEdge, Schema, Table, TableSummary};
pub use report::{
    DeletionRecord, DeletionStatus, DeletionSummary, LineageEdge, LineageReport, SchemaListing,
    SchemaTables, TableLineage,
};
