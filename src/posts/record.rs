use std::fmt;

use serde_json::Value;

use crate::FieldMap;

pub const ID_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A row of the table: field values plus the identifier rows are keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub fields: FieldMap,
}

impl Record {
    pub fn new(id: RecordId, fields: FieldMap) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDecodeError {
    #[error("expected a JSON array of records")]
    NotAnArray,
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("record {index} has no \"{key}\"", key = ID_KEY)]
    MissingId { index: usize },
    #[error("record {index} has a non-integer \"{key}\": {value}", key = ID_KEY)]
    InvalidId { index: usize, value: String },
}

/// Decodes a list response. Object key order is kept, and the identifier key
/// is pulled out of the field map.
pub fn records_from_json(value: &Value) -> Result<Vec<Record>, RecordDecodeError> {
    let Value::Array(items) = value else {
        return Err(RecordDecodeError::NotAnArray);
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| record_from_json(index, item))
        .collect()
}

fn record_from_json(index: usize, value: &Value) -> Result<Record, RecordDecodeError> {
    let Value::Object(map) = value else {
        return Err(RecordDecodeError::NotAnObject { index });
    };
    let id = match map.get(ID_KEY) {
        None => return Err(RecordDecodeError::MissingId { index }),
        Some(raw) => parse_id(raw).ok_or_else(|| RecordDecodeError::InvalidId {
            index,
            value: raw.to_string(),
        })?,
    };
    let fields = map
        .iter()
        .filter(|(key, _)| key.as_str() != ID_KEY)
        .map(|(key, value)| (key.clone(), display_value(value)))
        .collect();
    Ok(Record::new(id, fields))
}

fn parse_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(number) => number.as_i64().map(RecordId),
        Value::String(raw) => raw.trim().parse().ok().map(RecordId),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_in_key_order() {
        let records =
            records_from_json(&json!([{"zeta": "1", "id": 5, "alpha": "2"}])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId(5));
        assert_eq!(
            records[0].fields.keys().collect::<Vec<_>>(),
            vec!["zeta", "alpha"]
        );
    }

    #[test]
    fn stringifies_non_string_values() {
        let records = records_from_json(&json!([
            {"id": "7", "n": 3, "b": true, "missing": null, "list": [1, 2]}
        ]))
        .unwrap();
        let record = &records[0];
        assert_eq!(record.id, RecordId(7));
        assert_eq!(record.get("n"), Some("3"));
        assert_eq!(record.get("b"), Some("true"));
        assert_eq!(record.get("missing"), Some(""));
        assert_eq!(record.get("list"), Some("[1,2]"));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(
            records_from_json(&json!({"id": 1})),
            Err(RecordDecodeError::NotAnArray)
        );
        assert_eq!(
            records_from_json(&json!([{"id": 1}, 2])),
            Err(RecordDecodeError::NotAnObject { index: 1 })
        );
        assert_eq!(
            records_from_json(&json!([{"x": "1"}])),
            Err(RecordDecodeError::MissingId { index: 0 })
        );
        assert!(matches!(
            records_from_json(&json!([{"id": "abc"}])),
            Err(RecordDecodeError::InvalidId { index: 0, .. })
        ));
    }

    #[test]
    fn decode_errors_name_the_record() {
        assert_eq!(
            RecordDecodeError::MissingId { index: 3 }.to_string(),
            r#"record 3 has no "id""#
        );
        let err = records_from_json(&json!([{"id": 1.5}])).unwrap_err();
        assert_eq!(err.to_string(), r#"record 0 has a non-integer "id": 1.5"#);
    }
}
