//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the event_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

impl From<RegistrationEntity> for domain::models::Registration {
    fn from(entity: RegistrationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            event_id: entity.event_id,
            registered_at: entity.registered_at,
        }
    }
}
