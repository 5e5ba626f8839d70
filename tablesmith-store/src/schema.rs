//! Table schema documents
//!
//! Schema documents are JSON files using DynamoDB's wire field names
//! (`TableName`, `KeySchema`, `AttributeDefinitions`, ...), so the same file
//! works with the AWS CLI's `create-table --cli-input-json`. A document is
//! parsed once per bootstrap run and handed to [`crate::TableStore`].

use crate::error::{Result, StoreError};
use aws_sdk_dynamodb::types;
use serde::Deserialize;

/// Parsed table schema document
///
/// Used for both CreateTable (full document) and UpdateTable (table name plus
/// whichever updatable sections the document carries).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSchema {
    /// Table name; identity of the schema
    pub table_name: String,

    /// Partition key first, then optional sort key
    #[serde(default)]
    pub key_schema: Vec<KeySpec>,

    /// Attribute type declarations for key attributes
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeSpec>,

    /// Provisioned read/write capacity
    #[serde(default)]
    pub provisioned_throughput: Option<ThroughputSpec>,

    /// "PROVISIONED" or "PAY_PER_REQUEST"
    #[serde(default)]
    pub billing_mode: Option<String>,
}

/// One KeySchema entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySpec {
    pub attribute_name: String,
    /// "HASH" or "RANGE"
    pub key_type: String,
}

/// One AttributeDefinitions entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeSpec {
    pub attribute_name: String,
    /// "S", "N" or "B"
    pub attribute_type: String,
}

/// ProvisionedThroughput section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThroughputSpec {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl TableSchema {
    /// Parse a schema document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let schema: TableSchema = serde_json::from_str(text)
            .map_err(|e| StoreError::invalid_schema(format!("malformed schema document: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check the invariants every schema document must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(StoreError::invalid_schema("TableName must be non-empty"));
        }
        Ok(())
    }

    /// KeySchema entries as SDK types
    pub(crate) fn key_schema_elements(&self) -> Result<Vec<types::KeySchemaElement>> {
        self.key_schema
            .iter()
            .map(|k| {
                types::KeySchemaElement::builder()
                    .attribute_name(&k.attribute_name)
                    .key_type(types::KeyType::from(k.key_type.as_str()))
                    .build()
                    .map_err(|e| StoreError::invalid_schema(format!("KeySchema: {e}")))
            })
            .collect()
    }

    /// AttributeDefinitions entries as SDK types
    pub(crate) fn attribute_definitions(&self) -> Result<Vec<types::AttributeDefinition>> {
        self.attribute_definitions
            .iter()
            .map(|a| {
                types::AttributeDefinition::builder()
                    .attribute_name(&a.attribute_name)
                    .attribute_type(types::ScalarAttributeType::from(a.attribute_type.as_str()))
                    .build()
                    .map_err(|e| StoreError::invalid_schema(format!("AttributeDefinitions: {e}")))
            })
            .collect()
    }

    /// ProvisionedThroughput section as an SDK type, if present
    pub(crate) fn provisioned_throughput(&self) -> Result<Option<types::ProvisionedThroughput>> {
        self.provisioned_throughput
            .as_ref()
            .map(|t| {
                types::ProvisionedThroughput::builder()
                    .read_capacity_units(t.read_capacity_units)
                    .write_capacity_units(t.write_capacity_units)
                    .build()
                    .map_err(|e| StoreError::invalid_schema(format!("ProvisionedThroughput: {e}")))
            })
            .transpose()
    }

    /// BillingMode as an SDK type, if present
    pub(crate) fn billing_mode(&self) -> Option<types::BillingMode> {
        self.billing_mode
            .as_deref()
            .map(types::BillingMode::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS_SCHEMA: &str = r#"{
        "TableName": "users",
        "KeySchema": [
            {"AttributeName": "user_id", "KeyType": "HASH"},
            {"AttributeName": "created_at", "KeyType": "RANGE"}
        ],
        "AttributeDefinitions": [
            {"AttributeName": "user_id", "AttributeType": "S"},
            {"AttributeName": "created_at", "AttributeType": "N"}
        ],
        "ProvisionedThroughput": {
            "ReadCapacityUnits": 5,
            "WriteCapacityUnits": 5
        }
    }"#;

    #[test]
    fn parses_full_create_document() {
        let schema = TableSchema::from_json(USERS_SCHEMA).expect("valid schema");
        assert_eq!(schema.table_name, "users");
        assert_eq!(schema.key_schema.len(), 2);
        assert_eq!(schema.key_schema[0].attribute_name, "user_id");
        assert_eq!(schema.key_schema[0].key_type, "HASH");
        assert_eq!(schema.attribute_definitions[1].attribute_type, "N");
        let throughput = schema.provisioned_throughput.as_ref().unwrap();
        assert_eq!(throughput.read_capacity_units, 5);
    }

    #[test]
    fn update_document_may_omit_key_schema() {
        let schema = TableSchema::from_json(
            r#"{"TableName": "users", "ProvisionedThroughput":
                {"ReadCapacityUnits": 10, "WriteCapacityUnits": 10}}"#,
        )
        .expect("valid update schema");
        assert!(schema.key_schema.is_empty());
        assert!(schema.provisioned_throughput.is_some());
    }

    #[test]
    fn empty_table_name_is_rejected() {
        let err = TableSchema::from_json(r#"{"TableName": "  "}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSchema(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = TableSchema::from_json("{not json").unwrap_err();
        assert!(matches!(err, StoreError::InvalidSchema(_)));
    }

    #[test]
    fn sdk_conversion_produces_matching_elements() {
        let schema = TableSchema::from_json(USERS_SCHEMA).unwrap();
        let elements = schema.key_schema_elements().expect("convertible");
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].attribute_name(), "user_id");
        let defs = schema.attribute_definitions().expect("convertible");
        assert_eq!(defs.len(), 2);
        assert!(schema.provisioned_throughput().expect("convertible").is_some());
    }
}
