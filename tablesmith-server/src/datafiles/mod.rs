//! Data file enumeration, classification and parsing
//!
//! The data directory layout mirrors the lifecycle phases:
//!
//! ```text
//! {data_path}/create/*.json        table schemas to create
//! {data_path}/update/*.json        table schema updates to apply
//! {data_path}/seed/<table>/<file>  files seeded at startup
//! {data_path}/load/<table>/<file>  files loadable on demand via the API
//! ```
//!
//! Seed and load files come in three formats, told apart by suffix. The
//! classifier is a pure function over the file name; parsers are format
//! specific and yield records lazily.

mod parser;
mod source;

pub use parser::read_records;
pub use source::DataSource;

use std::path::PathBuf;
use thiserror::Error;

/// Suffix for files already in DynamoDB's typed wire format
pub const DYNAMODB_JSON_SUFFIX: &str = ".dynamodb.json";

/// Suffix for tabular text files
pub const CSV_SUFFIX: &str = ".csv";

/// Suffix for generic JSON record files
pub const JSON_SUFFIX: &str = ".json";

/// Content format of a seed/load data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFileKind {
    /// Header row plus text rows; every value is a string
    Csv,
    /// JSON array of objects with JSON-native typing
    Json,
    /// JSON array of objects already in the store's typed wire format
    DynamoDbJson,
}

/// Errors from data file handling
#[derive(Debug, Error)]
pub enum DataFileError {
    /// File name matches no recognized suffix
    #[error("unknown data file format: {0}")]
    UnknownFormat(String),

    /// File is unreadable or its content is malformed
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

impl DataFileError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Classify a file name by suffix
///
/// The double suffix is checked first so `items.dynamodb.json` never
/// classifies as generic JSON.
pub fn classify(file_name: &str) -> Result<DataFileKind, DataFileError> {
    if file_name.ends_with(DYNAMODB_JSON_SUFFIX) {
        Ok(DataFileKind::DynamoDbJson)
    } else if file_name.ends_with(CSV_SUFFIX) {
        Ok(DataFileKind::Csv)
    } else if file_name.ends_with(JSON_SUFFIX) {
        Ok(DataFileKind::Json)
    } else {
        Err(DataFileError::UnknownFormat(file_name.to_string()))
    }
}
