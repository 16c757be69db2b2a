pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod store;
pub mod types;

pub use api::{CatalogApi, DeleteOutcome, OpenMetadataApi};
pub use config::Config;
pub use error::JanitorError;
pub use pipeline::Pipeline;
pub use store::SnapshotStore;
