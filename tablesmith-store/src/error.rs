//! Error types for the DynamoDB store boundary

use thiserror::Error;

/// Errors from table store operations
///
/// Provider error codes are normalized into this taxonomy at the client
/// boundary so callers never match on DynamoDB-specific strings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store endpoint could not be reached (connectivity, DNS, timeout)
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Table does not exist
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Schema document is missing required fields or malformed
    #[error("invalid table schema: {0}")]
    InvalidSchema(String),

    /// Record could not be expressed as store attribute values
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Any other DynamoDB SDK error
    #[error("DynamoDB error: {0}")]
    Sdk(String),
}

impl StoreError {
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    pub fn table_not_found(msg: impl Into<String>) -> Self {
        Self::TableNotFound(msg.into())
    }

    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn sdk(msg: impl Into<String>) -> Self {
        Self::Sdk(msg.into())
    }
}

/// Result type for table store operations
pub type Result<T> = std::result::Result<T, StoreError>;
