//! Record types and attribute value conversion
//!
//! A [`Record`] is one item to be written to a table: a map from attribute
//! name to a typed DynamoDB value. Records are built from two input shapes:
//!
//! - plain JSON objects, where each value carries JSON-native typing and is
//!   converted to the closest DynamoDB type
//! - DynamoDB-JSON objects, where each value is already wrapped in the wire
//!   format's type tag (`{"S": "..."}`, `{"N": "..."}`, ...) and is
//!   re-expressed without re-typing

use crate::error::{Result, StoreError};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// One item keyed by attribute name
pub type Record = HashMap<String, AttributeValue>;

/// Convert a JSON object to a [`Record`] with JSON-native value typing
pub fn record_from_json(obj: &serde_json::Map<String, JsonValue>) -> Record {
    obj.iter()
        .filter_map(|(k, v)| json_to_attribute_value(v).map(|attr| (k.clone(), attr)))
        .collect()
}

/// Convert a single JSON value to a DynamoDB AttributeValue
pub fn json_to_attribute_value(val: &JsonValue) -> Option<AttributeValue> {
    match val {
        JsonValue::Null => Some(AttributeValue::Null(true)),
        JsonValue::Bool(b) => Some(AttributeValue::Bool(*b)),
        JsonValue::Number(n) => Some(AttributeValue::N(n.to_string())),
        JsonValue::String(s) => Some(AttributeValue::S(s.clone())),
        JsonValue::Array(arr) => {
            let items: Vec<_> = arr.iter().filter_map(json_to_attribute_value).collect();
            Some(AttributeValue::L(items))
        }
        JsonValue::Object(obj) => {
            let map: HashMap<String, AttributeValue> = obj
                .iter()
                .filter_map(|(k, v)| json_to_attribute_value(v).map(|attr| (k.clone(), attr)))
                .collect();
            Some(AttributeValue::M(map))
        }
    }
}

/// Convert a DynamoDB-JSON object to a [`Record`]
///
/// Every value must be a single-key object whose key is a wire type tag.
pub fn record_from_wire_json(obj: &serde_json::Map<String, JsonValue>) -> Result<Record> {
    obj.iter()
        .map(|(k, v)| wire_to_attribute_value(v).map(|attr| (k.clone(), attr)))
        .collect()
}

/// Convert one wire-format value (`{"S": "..."}`, `{"N": "..."}`, ...) to an
/// AttributeValue
pub fn wire_to_attribute_value(val: &JsonValue) -> Result<AttributeValue> {
    let obj = val
        .as_object()
        .ok_or_else(|| StoreError::invalid_record(format!("expected type-tagged object, got {val}")))?;

    let (tag, inner) = obj
        .iter()
        .next()
        .filter(|_| obj.len() == 1)
        .ok_or_else(|| {
            StoreError::invalid_record("attribute value must have exactly one type tag")
        })?;

    match (tag.as_str(), inner) {
        ("S", JsonValue::String(s)) => Ok(AttributeValue::S(s.clone())),
        ("N", JsonValue::String(n)) => Ok(AttributeValue::N(n.clone())),
        // Some exporters emit numbers unquoted
        ("N", JsonValue::Number(n)) => Ok(AttributeValue::N(n.to_string())),
        ("BOOL", JsonValue::Bool(b)) => Ok(AttributeValue::Bool(*b)),
        ("NULL", _) => Ok(AttributeValue::Null(true)),
        ("B", JsonValue::String(b64)) => {
            let bytes = BASE64
                .decode(b64)
                .map_err(|e| StoreError::invalid_record(format!("invalid base64 binary: {e}")))?;
            Ok(AttributeValue::B(Blob::new(bytes)))
        }
        ("SS", JsonValue::Array(items)) => {
            let strings = items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        StoreError::invalid_record("SS members must be strings")
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(AttributeValue::Ss(strings))
        }
        ("NS", JsonValue::Array(items)) => {
            let numbers = items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => Ok(s.clone()),
                    JsonValue::Number(n) => Ok(n.to_string()),
                    _ => Err(StoreError::invalid_record("NS members must be numbers")),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(AttributeValue::Ns(numbers))
        }
        ("L", JsonValue::Array(items)) => {
            let list = items
                .iter()
                .map(wire_to_attribute_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(AttributeValue::L(list))
        }
        ("M", JsonValue::Object(map)) => {
            let inner_map = map
                .iter()
                .map(|(k, v)| wire_to_attribute_value(v).map(|attr| (k.clone(), attr)))
                .collect::<Result<HashMap<_, _>>>()?;
            Ok(AttributeValue::M(inner_map))
        }
        (other, _) => Err(StoreError::invalid_record(format!(
            "unsupported attribute type tag: {other}"
        ))),
    }
}
