//! Column inference for the records table.
//!
//! The column set is taken from the last record only, in that record's own
//! key order. Earlier records with other keys simply show empty cells; keys
//! that only earlier records have are not shown at all.

use crate::posts::Record;

pub const NO_DATA_LABEL: &str = "No data available";

pub fn columns(records: &[Record]) -> Vec<&str> {
    records
        .last()
        .map(|record| record.fields.keys().collect())
        .unwrap_or_default()
}

/// Cell values of `record` for `columns`, empty where the record has no value.
pub fn cells<'a>(record: &'a Record, columns: &[&str]) -> Vec<&'a str> {
    columns
        .iter()
        .map(|column| record.get(column).unwrap_or(""))
        .collect()
}
