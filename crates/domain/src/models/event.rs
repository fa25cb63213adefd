//! Event domain model, its form schema and the listing filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;
use shared::validation::{format_datetime_local, parse_event_datetime};

/// Maximum length of the title, description and location fields.
pub const MAX_TEXT_LENGTH: u64 = 200;

/// An event owned by its organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    /// Set once at creation, never reassigned.
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event with the fields the detail page joins in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub organizer_username: String,
    pub registration_count: i64,
}

/// Create/update form as posted by the browser.
///
/// Any `organizer` input in the submission is not part of the schema and is
/// dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EventForm {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(
        max = 200,
        message = "Ensure this value has at most 200 characters."
    ))]
    pub title: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(
        max = 200,
        message = "Ensure this value has at most 200 characters."
    ))]
    pub description: String,

    #[validate(custom(function = "shared::validation::validate_event_datetime"))]
    pub date: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(
        max = 200,
        message = "Ensure this value has at most 200 characters."
    ))]
    pub location: String,
}

/// Validated event fields, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

impl EventForm {
    /// Prefills the form from an existing event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: format_datetime_local(&event.date),
            location: event.location.clone(),
        }
    }

    /// Validates the submission and converts it into an [`EventInput`].
    pub fn clean(&self) -> Result<EventInput, FormErrors> {
        if let Err(errors) = self.validate() {
            return Err(FormErrors::from_validation(&errors));
        }

        let date = parse_event_datetime(&self.date).ok_or_else(|| {
            let mut errors = FormErrors::new();
            errors.add("date", "Enter a valid date/time.");
            errors
        })?;

        Ok(EventInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date,
            location: self.location.trim().to_string(),
        })
    }
}

/// Query string of the list view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub q: Option<String>,
}

impl EventQuery {
    /// The title filter, or `None` when absent or only whitespace.
    pub fn title_filter(&self) -> Option<&str> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}
