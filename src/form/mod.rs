//! Form state: the field registry, the values typed so far, the errors of the
//! last validation pass and the in-flight submission flag.
//!
//! Submission is split in two halves so a UI loop can hand the network call to
//! a background task: [`Form::begin_submit`] validates and snapshots the values,
//! [`Form::finish_submit`] applies the outcome. [`Form::submit`] chains both
//! around an async callback.

use std::{fmt::Display, future::Future};

use crate::FieldMap;

mod registry;
mod validation;

pub use registry::{
    ADD_FIELD_LABEL, CAPACITY_REACHED_LABEL, DEFAULT_FIELD_COUNT, FieldError, FieldRegistry,
    MAX_FIELDS,
};
pub use validation::{REQUIRED_MESSAGE, ValidationErrors, validate};

pub const SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are stored and nothing was sent.
    Invalid,
    /// The callback succeeded and the values were cleared.
    Submitted,
    /// The callback failed; the error was logged and the values kept.
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: FieldRegistry,
    values: FieldMap,
    errors: ValidationErrors,
    submitting: bool,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: FieldRegistry) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).unwrap_or("")
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn add_field(&mut self) -> Result<&str, FieldError> {
        let name = self.fields.add()?;
        tracing::debug!(field = %name, "Added form field");
        Ok(name)
    }

    /// Sets a single value. Names outside the registry are ignored.
    pub fn update_value(&mut self, field: &str, value: impl Into<String>) -> bool {
        if !self.fields.contains(field) {
            tracing::debug!(field = %field, "Ignoring value for unknown field");
            return false;
        }
        self.values.insert(field, value);
        true
    }

    pub fn validate(&self) -> ValidationErrors {
        validate(self.fields.names(), &self.values)
    }

    /// Validates the current values and, when they pass, marks the form as
    /// submitting and returns the values in registry order.
    ///
    /// On failure the errors replace the previous ones and `None` is returned.
    pub fn begin_submit(&mut self) -> Option<FieldMap> {
        let errors = self.validate();
        if !errors.is_empty() {
            tracing::debug!(invalid = errors.len(), "Form validation failed");
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        self.submitting = true;
        Some(self.snapshot())
    }

    /// Applies the result of the submit callback. Failures are only logged.
    pub fn finish_submit<E: Display>(&mut self, result: Result<(), E>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.values.clear();
                SubmitOutcome::Submitted
            }
            Err(err) => {
                tracing::error!("Error submitting form: {err}");
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn submit<F, Fut, E>(&mut self, on_submit: F) -> SubmitOutcome
    where
        F: FnOnce(FieldMap) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let Some(values) = self.begin_submit() else {
            return SubmitOutcome::Invalid;
        };
        let result = on_submit(values).await;
        self.finish_submit(result)
    }

    fn snapshot(&self) -> FieldMap {
        self.fields
            .names()
            .iter()
            .map(|field| (field.clone(), self.value(field).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn two_field_form() -> Form {
        Form::with_fields(FieldRegistry::from_names(["a", "b"]))
    }

    #[test]
    fn update_value_touches_one_key() {
        let mut form = two_field_form();
        assert!(form.update_value("a", "1"));
        assert!(form.update_value("b", "2"));
        assert!(form.update_value("a", "3"));
        assert_eq!(form.value("a"), "3");
        assert_eq!(form.value("b"), "2");
        assert!(!form.update_value("missing", "x"));
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn invalid_submit_never_calls_back() {
        let mut form = two_field_form();
        form.update_value("a", "1");
        let called = Cell::new(false);
        let outcome = form
            .submit(|_| {
                called.set(true);
                async { Ok::<(), String>(()) }
            })
            .await;
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(!called.get());
        assert!(!form.is_submitting());
        assert_eq!(form.error("b"), Some(REQUIRED_MESSAGE));
        assert_eq!(form.value("a"), "1");
    }

    #[tokio::test]
    async fn successful_submit_clears_values_and_errors() {
        let mut form = two_field_form();
        form.begin_submit();
        assert_eq!(form.errors().len(), 2);

        form.update_value("b", "2");
        form.update_value("a", "1");
        let mut seen = None;
        let outcome = form
            .submit(|values| {
                seen = Some(values);
                async { Ok::<(), String>(()) }
            })
            .await;
        assert_eq!(outcome, SubmitOutcome::Submitted);
        let seen = seen.unwrap();
        assert_eq!(seen.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(seen.get("a"), Some("1"));
        assert!(form.values().is_empty());
        assert!(form.errors().is_empty());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn failed_submit_keeps_values() {
        let mut form = two_field_form();
        form.update_value("a", "1");
        form.update_value("b", "2");
        let outcome = form
            .submit(|_| async { Err::<(), _>("Server error: bad request") })
            .await;
        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(form.value("a"), "1");
        assert_eq!(form.value("b"), "2");
        assert!(!form.is_submitting());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn labels_follow_submitting_flag() {
        let mut form = two_field_form();
        form.update_value("a", "1");
        form.update_value("b", "2");
        assert_eq!(form.submit_label(), SUBMIT_LABEL);
        assert!(form.begin_submit().is_some());
        assert!(form.is_submitting());
        assert_eq!(form.submit_label(), SUBMITTING_LABEL);
        form.finish_submit(Ok::<(), String>(()));
        assert_eq!(form.submit_label(), SUBMIT_LABEL);
    }

    #[test]
    fn errors_are_replaced_not_merged() {
        let mut form = two_field_form();
        form.update_value("a", "1");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.errors().keys().collect::<Vec<_>>(), vec!["b"]);

        form.update_value("a", "");
        form.update_value("b", "2");
        assert!(form.begin_submit().is_none());
        assert_eq!(form.errors().keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn add_field_respects_capacity() {
        let mut form = Form::new();
        assert_eq!(form.fields().len(), DEFAULT_FIELD_COUNT);
        while form.fields().can_add() {
            form.add_field().unwrap();
        }
        assert_eq!(form.fields().len(), MAX_FIELDS);
        assert_eq!(form.add_field(), Err(FieldError::CapacityReached));
        assert_eq!(form.fields().add_label(), CAPACITY_REACHED_LABEL);
    }
}
