//! DynamoDB table store boundary for tablesmith
//!
//! This crate owns every network call to the table store:
//!
//! - **Table management**: list, describe keys, create (blocking until
//!   active), update (accepted, not applied), delete (blocking until gone)
//! - **Item access**: paginated key scans, chunked batch deletes, single-item
//!   puts
//! - **Record conversion**: plain-JSON and DynamoDB-JSON inputs to native
//!   `AttributeValue` maps
//!
//! Create/update/delete are idempotent from the caller's perspective: a table
//! already in the target state surfaces as an outcome variant
//! ([`CreateOutcome::AlreadyExists`], [`UpdateOutcome::NoOp`]), never as an
//! error. Provider error codes are normalized into [`StoreError`] so callers
//! never depend on DynamoDB-specific strings.
//!
//! ## Usage
//!
//! ```ignore
//! use tablesmith_store::{StoreConfig, TableStore};
//!
//! let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
//! let store = TableStore::new(
//!     &sdk_config,
//!     StoreConfig {
//!         endpoint: Some("http://dynamodb:8000".to_string()),
//!         ..Default::default()
//!     },
//! );
//! let tables = store.list_tables().await?;
//! ```

pub mod client;
pub mod error;
pub mod record;
pub mod schema;

pub use client::{CreateOutcome, KeyPage, StoreConfig, TableStore, UpdateOutcome};

// Re-export the SDK value type so callers building records don't need their
// own aws-sdk-dynamodb dependency
pub use aws_sdk_dynamodb::types::AttributeValue;
pub use error::{Result, StoreError};
pub use record::{
    json_to_attribute_value, record_from_json, record_from_wire_json, wire_to_attribute_value,
    Record,
};
pub use schema::{AttributeSpec, KeySpec, TableSchema, ThroughputSpec};
