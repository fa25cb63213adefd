//! Registration domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's registration for an event. Unique per (user, event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

/// Whether the confirmation message went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    /// Delivery failed; the registration is kept.
    Failed(String),
}

/// Result of a registration request.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// A new registration was recorded.
    Registered {
        registration: Registration,
        notification: NotificationStatus,
    },
    /// The user was already registered; nothing changed.
    AlreadyRegistered,
}

impl RegistrationOutcome {
    /// Query-string notice shown on the detail page.
    pub fn notice(&self) -> &'static str {
        match self {
            RegistrationOutcome::Registered { .. } => "registered",
            RegistrationOutcome::AlreadyRegistered => "already_registered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_notice() {
        let registered = RegistrationOutcome::Registered {
            registration: Registration {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                event_id: Uuid::new_v4(),
                registered_at: Utc::now(),
            },
            notification: NotificationStatus::Sent,
        };
        assert_eq!(registered.notice(), "registered");
        assert_eq!(
            RegistrationOutcome::AlreadyRegistered.notice(),
            "already_registered"
        );
    }
}
