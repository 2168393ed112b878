use std::collections::BTreeMap;

use crate::FieldMap;

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Per-field error messages from one validation pass.
pub type ValidationErrors = BTreeMap<String, String>;

/// Checks every registered field for a non-empty value.
pub fn validate(fields: &[String], values: &FieldMap) -> ValidationErrors {
    fields
        .iter()
        .filter(|field| values.get(field).is_none_or(str::is_empty))
        .map(|field| (field.clone(), REQUIRED_MESSAGE.to_string()))
        .collect()
}
