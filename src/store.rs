//! Stage snapshots on the local filesystem.
//!
//! Layout under the output directory:
//! - `schemas.json`: schema listing (stage 1)
//! - `tables/<schema fqn>.json`: table details, one file per schema (stage 2)
//! - `lineage_report.json`: deduplicated edges selected for cleanup (stage 3)
//! - `deletion_results.json`: per-edge outcome of the delete run (stage 4)

use crate::error::JanitorError;
use crate::types::{DeletionSummary, LineageReport, SchemaListing, SchemaTables};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SCHEMAS_FILE: &str = "schemas.json";
const TABLES_DIR: &str = "tables";
const LINEAGE_FILE: &str = "lineage_report.json";
const DELETION_FILE: &str = "deletion_results.json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn schemas_path(&self) -> PathBuf {
        self.root.join(SCHEMAS_FILE)
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join(TABLES_DIR)
    }

    pub fn tables_path(&self, schema_fqn: &str) -> PathBuf {
        self.tables_dir()
            .join(format!("{}.json", file_stem_for(schema_fqn)))
    }

    pub fn lineage_path(&self) -> PathBuf {
        self.root.join(LINEAGE_FILE)
    }

    pub fn deletion_path(&self) -> PathBuf {
        self.root.join(DELETION_FILE)
    }

    pub fn write_schemas(&self, listing: &SchemaListing) -> Result<PathBuf, JanitorError> {
        let path = self.schemas_path();
        write_json(&path, listing)?;
        Ok(path)
    }

    pub fn read_schemas(&self) -> Result<SchemaListing, JanitorError> {
        read_json(&self.schemas_path())
    }

    pub fn write_tables(&self, tables: &SchemaTables) -> Result<PathBuf, JanitorError> {
        let path = self.tables_path(&tables.schema);
        write_json(&path, tables)?;
        Ok(path)
    }

    /// Remove every table snapshot left by an earlier collection run.
    pub fn clear_tables(&self) -> Result<(), JanitorError> {
        match fs::remove_dir_all(self.tables_dir()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the table snapshots of every schema in the listing.
    ///
    /// Schemas without a snapshot (skipped by the collector) are logged and left out.
    pub fn read_tables(&self, listing: &SchemaListing) -> Result<Vec<SchemaTables>, JanitorError> {
        let mut loaded = Vec::with_capacity(listing.data.len());
        for schema in &listing.data {
            let path = self.tables_path(&schema.fully_qualified_name);
            match read_json::<SchemaTables>(&path) {
                Ok(tables) => loaded.push(tables),
                Err(JanitorError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    warn!(
                        schema = %schema.fully_qualified_name,
                        path = %path.display(),
                        "no table snapshot for schema; skipping"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(loaded)
    }

    pub fn write_lineage(&self, report: &LineageReport) -> Result<PathBuf, JanitorError> {
        let path = self.lineage_path();
        write_json(&path, report)?;
        Ok(path)
    }

    pub fn read_lineage(&self) -> Result<LineageReport, JanitorError> {
        read_json(&self.lineage_path())
    }

    pub fn write_deletions(&self, summary: &DeletionSummary) -> Result<PathBuf, JanitorError> {
        let path = self.deletion_path();
        write_json(&path, summary)?;
        Ok(path)
    }
}

/// Schema FQNs may contain characters that are not valid in file names.
fn file_stem_for(fqn: &str) -> String {
    fqn.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Write via a sibling temp file and rename, so readers never see a torn snapshot.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), JanitorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "snapshot written");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JanitorError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
