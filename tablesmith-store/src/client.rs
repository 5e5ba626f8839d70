//! DynamoDB table store client
//!
//! Thin boundary over `aws_sdk_dynamodb::Client` exposing exactly the
//! operations the bootstrap orchestrator needs. All provider error codes are
//! normalized into [`StoreError`] here; idempotency signals (table already
//! exists, no-op update) surface as outcome variants rather than errors.

use crate::error::{Result, StoreError};
use crate::record::Record;
use crate::schema::TableSchema;
use aws_sdk_dynamodb::client::Waiters;
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{DeleteRequest, KeyType, WriteRequest};
use aws_sdk_dynamodb::Client;
use aws_smithy_types::timeout::TimeoutConfig;
use std::time::Duration;
use tracing::debug;

/// DynamoDB writes at most 25 items per BatchWriteItem call
const MAX_BATCH_WRITE: usize = 25;

/// How long to wait for a table to converge after create/delete
const TABLE_WAIT: Duration = Duration::from_secs(120);

/// Table store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// AWS region (optional, uses SDK default if not specified)
    pub region: Option<String>,
    /// Optional endpoint override (e.g. DynamoDB Local)
    pub endpoint: Option<String>,
    /// Operation timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Outcome of a create-table call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Table was created and is now active
    Created,
    /// Table already existed; left untouched
    AlreadyExists,
}

/// Outcome of an update-table call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Update was accepted by the store (it may still be applying)
    Applied,
    /// Store reported the update changes nothing
    NoOp,
}

/// One page of item keys from a key scan
#[derive(Debug, Clone)]
pub struct KeyPage {
    /// Key attribute maps for every item in the page
    pub keys: Vec<Record>,
    /// Continuation token for the next page, if any
    pub next: Option<Record>,
}

/// DynamoDB-backed table store
#[derive(Clone)]
pub struct TableStore {
    client: Client,
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore").finish()
    }
}

impl TableStore {
    /// Create a new table store client
    ///
    /// Builds the DynamoDB config by inheriting from the shared SdkConfig
    /// (preserves HTTP client, retry config, credentials chain) then applies
    /// the region/endpoint/timeout overrides.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: StoreConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Create from a pre-built client (for testing)
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// List every table name known to the store, in store order
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut start_table = None;

        loop {
            let mut request = self.client.list_tables();

            if let Some(start) = start_table.take() {
                request = request.exclusive_start_table_name(start);
            }

            let response = request
                .send()
                .await
                .map_err(|e| normalize_error("ListTables", e))?;

            names.extend(response.table_names().iter().cloned());

            match response.last_evaluated_table_name() {
                Some(next) => start_table = Some(next.to_string()),
                None => break,
            }
        }

        Ok(names)
    }

    /// Key attribute names for a table: partition key first, then sort key
    pub async fn key_attributes(&self, table: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| normalize_table_error("DescribeTable", table, e))?;

        let description = response
            .table()
            .ok_or_else(|| StoreError::sdk(format!("DescribeTable {table}: empty response")))?;

        let mut keys = Vec::new();
        for key_type in [KeyType::Hash, KeyType::Range] {
            for element in description.key_schema() {
                if *element.key_type() == key_type {
                    keys.push(element.attribute_name().to_string());
                }
            }
        }

        Ok(keys)
    }

    /// Approximate item count for a table (from DescribeTable)
    pub async fn item_count(&self, table: &str) -> Result<i64> {
        let response = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| normalize_table_error("DescribeTable", table, e))?;

        Ok(response.table().and_then(|t| t.item_count()).unwrap_or(0))
    }

    /// Create a table from a schema document and block until it is active
    ///
    /// A table that already exists is not an error and is left untouched.
    pub async fn create_table(&self, schema: &TableSchema) -> Result<CreateOutcome> {
        schema.validate()?;
        let table = &schema.table_name;

        let mut request = self
            .client
            .create_table()
            .table_name(table)
            .set_key_schema(Some(schema.key_schema_elements()?))
            .set_attribute_definitions(Some(schema.attribute_definitions()?))
            .set_provisioned_throughput(schema.provisioned_throughput()?);

        if let Some(mode) = schema.billing_mode() {
            request = request.billing_mode(mode);
        }

        match request.send().await {
            Ok(_) => {}
            Err(e) if e.code() == Some("ResourceInUseException") => {
                return Ok(CreateOutcome::AlreadyExists);
            }
            Err(e) => return Err(normalize_table_error("CreateTable", table, e)),
        }

        self.client
            .wait_until_table_exists()
            .table_name(table)
            .wait(TABLE_WAIT)
            .await
            .map_err(|e| StoreError::sdk(format!("waiting for table {table} to be active: {e}")))?;

        debug!(table = %table, "table active");
        Ok(CreateOutcome::Created)
    }

    /// Apply a schema update to a table
    ///
    /// Returns once the store accepts the update; does not wait for it to be
    /// applied. A store response saying nothing would change is not an error.
    pub async fn update_table(&self, schema: &TableSchema) -> Result<UpdateOutcome> {
        schema.validate()?;
        let table = &schema.table_name;

        let mut request = self
            .client
            .update_table()
            .table_name(table)
            .set_provisioned_throughput(schema.provisioned_throughput()?);

        if !schema.attribute_definitions.is_empty() {
            request = request.set_attribute_definitions(Some(schema.attribute_definitions()?));
        }

        if let Some(mode) = schema.billing_mode() {
            request = request.billing_mode(mode);
        }

        match request.send().await {
            Ok(_) => Ok(UpdateOutcome::Applied),
            // DynamoDB rejects updates that change nothing with a
            // ValidationException; the store treats that as already applied.
            Err(e) if e.code() == Some("ValidationException") => Ok(UpdateOutcome::NoOp),
            Err(e) if e.code() == Some("ResourceInUseException") => Ok(UpdateOutcome::NoOp),
            Err(e) => Err(normalize_table_error("UpdateTable", table, e)),
        }
    }

    /// Delete a table and block until it no longer exists
    pub async fn delete_table(&self, table: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| normalize_table_error("DeleteTable", table, e))?;

        self.client
            .wait_until_table_not_exists()
            .table_name(table)
            .wait(TABLE_WAIT)
            .await
            .map_err(|e| StoreError::sdk(format!("waiting for table {table} to be deleted: {e}")))?;

        debug!(table = %table, "table deleted");
        Ok(())
    }

    /// Scan one page of item keys
    ///
    /// Projects only the key attributes, using expression attribute name
    /// placeholders since key names may collide with DynamoDB reserved words.
    pub async fn scan_key_page(
        &self,
        table: &str,
        key_attributes: &[String],
        start_key: Option<Record>,
    ) -> Result<KeyPage> {
        let mut request = self.client.scan().table_name(table);

        let mut placeholders = Vec::with_capacity(key_attributes.len());
        for (i, attr) in key_attributes.iter().enumerate() {
            let placeholder = format!("#k{i}");
            request = request.expression_attribute_names(&placeholder, attr);
            placeholders.push(placeholder);
        }
        request = request.projection_expression(placeholders.join(", "));

        if let Some(start) = start_key {
            request = request.set_exclusive_start_key(Some(start));
        }

        let response = request
            .send()
            .await
            .map_err(|e| normalize_table_error("Scan", table, e))?;

        let keys = response.items().to_vec();
        let next = match response.last_evaluated_key() {
            Some(key) if !key.is_empty() => Some(key.clone()),
            _ => None,
        };

        Ok(KeyPage { keys, next })
    }

    /// Delete a batch of items by key, chunked at the store's batch limit
    ///
    /// Items the store reports as unprocessed are resubmitted until the
    /// batch drains.
    pub async fn batch_delete(&self, table: &str, keys: Vec<Record>) -> Result<()> {
        for chunk in keys.chunks(MAX_BATCH_WRITE) {
            let mut requests = chunk
                .iter()
                .map(|key| {
                    DeleteRequest::builder()
                        .set_key(Some(key.clone()))
                        .build()
                        .map(|del| WriteRequest::builder().delete_request(del).build())
                        .map_err(|e| StoreError::sdk(format!("building delete request: {e}")))
                })
                .collect::<Result<Vec<_>>>()?;

            while !requests.is_empty() {
                let submitted = requests.len();
                let response = self
                    .client
                    .batch_write_item()
                    .request_items(table, requests)
                    .send()
                    .await
                    .map_err(|e| normalize_table_error("BatchWriteItem", table, e))?;

                requests = response
                    .unprocessed_items()
                    .and_then(|items| items.get(table))
                    .cloned()
                    .unwrap_or_default();

                if !requests.is_empty() {
                    debug!(
                        table = %table,
                        submitted,
                        unprocessed = requests.len(),
                        "resubmitting unprocessed deletes"
                    );
                }
            }
        }

        Ok(())
    }

    /// Write (or overwrite) one item
    pub async fn put_item(&self, table: &str, record: Record) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(record))
            .send()
            .await
            .map_err(|e| normalize_table_error("PutItem", table, e))?;

        Ok(())
    }
}

/// Whether an SDK error means the store endpoint could not be reached
fn is_connection_error<E, R>(err: &SdkError<E, R>) -> bool {
    matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    )
}

/// Normalize an SDK error from an operation with no single-table scope
fn normalize_error<E, R>(op: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata,
{
    if is_connection_error(&err) {
        return StoreError::unreachable(format!("{op}: {err}"));
    }
    match err.message() {
        Some(msg) => StoreError::sdk(format!("{op}: {msg}")),
        None => StoreError::sdk(format!("{op}: {err}")),
    }
}

/// Normalize an SDK error from a per-table operation
fn normalize_table_error<E, R>(op: &str, table: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata,
{
    if is_connection_error(&err) {
        return StoreError::unreachable(format!("{op} {table}: {err}"));
    }
    if err.code() == Some("ResourceNotFoundException") {
        return StoreError::table_not_found(table.to_string());
    }
    match err.message() {
        Some(msg) => StoreError::sdk(format!("{op} {table}: {msg}")),
        None => StoreError::sdk(format!("{op} {table}: {err}")),
    }
}
