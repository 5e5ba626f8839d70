//! Format-specific record parsing
//!
//! Each parser yields records lazily so a large file is never held in memory
//! as a full set of store items. The CSV reader streams rows straight from
//! the file; the JSON parsers materialize the array once (JSON has no
//! incremental array shape worth the complexity here) and then yield records
//! one at a time.

use super::{DataFileError, DataFileKind};
use serde_json::Value as JsonValue;
use std::fs::File;
use std::path::Path;
use tablesmith_store::{record_from_json, record_from_wire_json, AttributeValue, Record};

/// A lazy sequence of records, each independently fallible
pub type RecordIter = Box<dyn Iterator<Item = Result<Record, DataFileError>> + Send>;

/// Open a classified data file and return its records
///
/// Fails up front if the file cannot be opened or its JSON is malformed;
/// individual bad records surface as per-record errors from the iterator.
pub fn read_records(path: &Path, kind: DataFileKind) -> Result<RecordIter, DataFileError> {
    match kind {
        DataFileKind::Csv => read_csv(path),
        DataFileKind::Json => read_json(path),
        DataFileKind::DynamoDbJson => read_dynamodb_json(path),
    }
}

/// Header row names the attributes; every value decodes as text
fn read_csv(path: &Path) -> Result<RecordIter, DataFileError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DataFileError::read(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| DataFileError::read(path, e.to_string()))?
        .clone();

    let path = path.to_path_buf();
    Ok(Box::new(reader.into_records().map(move |row| {
        let row = row.map_err(|e| DataFileError::read(&path, e.to_string()))?;
        Ok(headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.to_string(), AttributeValue::S(value.to_string())))
            .collect())
    })))
}

/// JSON array of objects; JSON-native typing is preserved
fn read_json(path: &Path) -> Result<RecordIter, DataFileError> {
    let values = read_json_array(path)?;
    let path = path.to_path_buf();
    Ok(Box::new(values.into_iter().map(move |value| match value {
        JsonValue::Object(obj) => Ok(record_from_json(&obj)),
        other => Err(DataFileError::read(
            &path,
            format!("expected a JSON object, got {other}"),
        )),
    })))
}

/// JSON array of objects already in the typed wire format
fn read_dynamodb_json(path: &Path) -> Result<RecordIter, DataFileError> {
    let values = read_json_array(path)?;
    let path = path.to_path_buf();
    Ok(Box::new(values.into_iter().map(move |value| match value {
        JsonValue::Object(obj) => {
            record_from_wire_json(&obj).map_err(|e| DataFileError::read(&path, e.to_string()))
        }
        other => Err(DataFileError::read(
            &path,
            format!("expected a JSON object, got {other}"),
        )),
    })))
}

fn read_json_array(path: &Path) -> Result<Vec<JsonValue>, DataFileError> {
    let file = File::open(path).map_err(|e| DataFileError::read(path, e.to_string()))?;
    serde_json::from_reader(file).map_err(|e| DataFileError::read(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(tmp: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn csv_header_names_fields_and_values_stay_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(&tmp, "users.csv", "id,name\n1,Alice\n");

        let records: Vec<_> = read_records(&path, DataFileKind::Csv)
            .expect("readable")
            .collect::<Result<_, _>>()
            .expect("all rows parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], AttributeValue::S("1".to_string()));
        assert_eq!(records[0]["name"], AttributeValue::S("Alice".to_string()));
    }

    #[test]
    fn json_array_yields_records_in_file_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(&tmp, "users.json", r#"[{"id": 1}, {"id": 2}]"#);

        let records: Vec<_> = read_records(&path, DataFileKind::Json)
            .expect("readable")
            .collect::<Result<_, _>>()
            .expect("all objects parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], AttributeValue::N("1".to_string()));
        assert_eq!(records[1]["id"], AttributeValue::N("2".to_string()));
    }

    #[test]
    fn dynamodb_json_passes_types_through() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(
            &tmp,
            "users.dynamodb.json",
            r#"[{"id": {"S": "1"}, "age": {"N": "30"}}]"#,
        );

        let records: Vec<_> = read_records(&path, DataFileKind::DynamoDbJson)
            .expect("readable")
            .collect::<Result<_, _>>()
            .expect("all items parse");

        assert_eq!(records[0]["id"], AttributeValue::S("1".to_string()));
        assert_eq!(records[0]["age"], AttributeValue::N("30".to_string()));
    }

    #[test]
    fn malformed_json_fails_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(&tmp, "bad.json", "[{");
        let err = read_records(&path, DataFileKind::Json).err().unwrap();
        assert!(matches!(err, DataFileError::Read { .. }));
    }

    #[test]
    fn missing_file_fails_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.csv");
        let err = read_records(&path, DataFileKind::Csv).err().unwrap();
        assert!(matches!(err, DataFileError::Read { .. }));
    }

    #[test]
    fn non_object_array_member_is_a_record_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_file(&tmp, "mixed.json", r#"[{"id": 1}, 42]"#);

        let results: Vec<_> = read_records(&path, DataFileKind::Json)
            .expect("readable")
            .collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
