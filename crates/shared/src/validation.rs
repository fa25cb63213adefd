//! Form-field validation helpers shared by the event and account forms.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use validator::ValidationError;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Accepted input layouts for event dates, tried in order.
///
/// The first two match what a `datetime-local` input submits.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

lazy_static::lazy_static! {
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[\w.@+-]+$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects values that are empty or only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("required", "This field is required."))
    } else {
        Ok(())
    }
}

/// Usernames: letters, digits and `@ . + - _` only.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error("required", "This field is required."));
    }
    if value.chars().count() > MAX_USERNAME_LENGTH {
        return Err(error(
            "username_length",
            "Username must be at most 150 characters.",
        ));
    }
    if !USERNAME_REGEX.is_match(value) {
        return Err(error(
            "username_chars",
            "Username may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// Parses an event date submitted by a form. The value is read as UTC.
///
/// A bare date (`YYYY-MM-DD`) is accepted and means midnight.
pub fn parse_event_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Validator adapter for [`parse_event_datetime`].
pub fn validate_event_datetime(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "This field is required."));
    }
    match parse_event_datetime(value) {
        Some(_) => Ok(()),
        None => Err(error("datetime_format", "Enter a valid date/time.")),
    }
}

/// Formats a timestamp for a `datetime-local` input value.
pub fn format_datetime_local(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}
