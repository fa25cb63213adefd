//! User domain model and account forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::form::FormErrors;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Contact address for registration confirmations.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Sign-up form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_passwords_match", skip_on_field_errors = false))]
pub struct SignupForm {
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirm: String,
}

impl SignupForm {
    /// Runs the schema and returns per-field errors.
    pub fn check(&self) -> Result<(), FormErrors> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => Err(FormErrors::from_validation(&errors)),
        }
    }
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    match shared::password::password_weakness(password) {
        None => Ok(()),
        Some(message) => {
            let mut err = ValidationError::new("password_weak");
            err.message = Some(format!("{}.", message).into());
            Err(err)
        }
    }
}

fn validate_passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password == form.password_confirm {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("The two password fields didn't match.".into());
        Err(err)
    }
}

/// Login form. `next` is carried through a hidden input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}
