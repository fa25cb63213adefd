//! Structured per-field form errors.

use std::collections::BTreeMap;
use validator::ValidationErrors;

const SCHEMA_KEY: &str = "__all__";

/// Errors collected while validating a submitted form.
///
/// Field errors are keyed by input name so templates can render each message
/// next to its input. Non-field errors apply to the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the messages from a `validator` run.
    ///
    /// Schema-level failures (reported under `__all__`) become non-field
    /// errors.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut form_errors = Self::new();
        for (field, field_errors) in errors.field_errors() {
            let field: &str = &field;
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}.", field));
                if field == SCHEMA_KEY {
                    form_errors.add_non_field(message);
                } else {
                    form_errors.add(field, message);
                }
            }
        }
        form_errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Messages for one input, empty if it validated.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn has_field(&self, field: &str) -> bool {
        !self.for_field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}
