//! Owner-only gate for event mutations.

use uuid::Uuid;

use crate::models::Event;

/// Decision of the authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    Denied,
}

impl Authorization {
    pub fn is_allowed(self) -> bool {
        self == Authorization::Allowed
    }
}

/// Only the organizer may update or delete an event.
///
/// Callers surface `Denied` as forbidden, never as not found.
pub fn authorize_mutation(requester: Uuid, event: &Event) -> Authorization {
    if event.organizer_id == requester {
        Authorization::Allowed
    } else {
        tracing::debug!(
            event_id = %event.id,
            requester = %requester,
            "Mutation denied for non-organizer"
        );
        Authorization::Denied
    }
}
