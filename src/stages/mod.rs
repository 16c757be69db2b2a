//! The four cleanup stages, each a plain function over [`CatalogApi`].
//!
//! [`CatalogApi`]: crate::api::CatalogApi

pub mod delete;
pub mod lineage;
pub mod schemas;
pub mod tables;

pub use delete::{DeleteMode, delete_lineage};
pub use lineage::{LineagePolicy, extract_lineage};
pub use schemas::fetch_schemas;
pub use tables::collect_tables;
