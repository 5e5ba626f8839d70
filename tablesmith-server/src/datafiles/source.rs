//! Directory-backed schema and seed file enumeration

use super::{DataFileError, JSON_SUFFIX};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tablesmith_store::TableSchema;

const CREATE_DIR: &str = "create";
const UPDATE_DIR: &str = "update";
const SEED_DIR: &str = "seed";
const LOAD_DIR: &str = "load";

/// Read-only view over the configured data directory
#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
}

impl DataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Schema documents for the create phase, sorted by file name
    pub fn create_schema_files(&self) -> Result<Vec<PathBuf>, DataFileError> {
        self.schema_files(CREATE_DIR)
    }

    /// Schema documents for the update phase, sorted by file name
    pub fn update_schema_files(&self) -> Result<Vec<PathBuf>, DataFileError> {
        self.schema_files(UPDATE_DIR)
    }

    fn schema_files(&self, dir: &str) -> Result<Vec<PathBuf>, DataFileError> {
        let paths = self.list_dir(&self.root.join(dir))?;
        Ok(paths
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(JSON_SUFFIX))
            })
            .collect())
    }

    /// Parse one schema document
    pub fn read_schema(&self, path: &Path) -> Result<TableSchema, DataFileError> {
        let text = fs::read_to_string(path)
            .map_err(|e| DataFileError::read(path, e.to_string()))?;
        TableSchema::from_json(&text).map_err(|e| DataFileError::read(path, e.to_string()))
    }

    /// Every (table, file) pair under the seed directory
    ///
    /// Tables enumerate in name order, files within a table likewise, so a
    /// bootstrap run processes seeds deterministically.
    pub fn seed_files(&self) -> Result<Vec<(String, PathBuf)>, DataFileError> {
        let mut pairs = Vec::new();
        for table_dir in self.list_dir(&self.root.join(SEED_DIR))? {
            if !table_dir.is_dir() {
                continue;
            }
            let Some(table) = table_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            for file in self.list_dir(&table_dir)? {
                pairs.push((table.to_string(), file));
            }
        }
        Ok(pairs)
    }

    /// File names available for on-demand load into a table
    pub fn load_files(&self, table: &str) -> Result<Vec<String>, DataFileError> {
        let files = self.list_dir(&self.root.join(LOAD_DIR).join(table))?;
        Ok(files
            .into_iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect())
    }

    /// Full path of an on-demand load file
    pub fn load_file_path(&self, table: &str, file: &str) -> PathBuf {
        self.root.join(LOAD_DIR).join(table).join(file)
    }

    /// Directory entries sorted by name; a missing directory is empty
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, DataFileError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DataFileError::read(dir, e.to_string())),
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| DataFileError::read(dir, e.to_string()))?;
        paths.sort();
        Ok(paths)
    }
}
