//! Event entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Event, EventDetail};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            date: entity.date,
            location: entity.location,
            organizer_id: entity.organizer_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Event row joined with its organizer's username and registration count.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithOrganizerEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub organizer_username: String,
    pub registration_count: i64,
}

impl From<EventWithOrganizerEntity> for EventDetail {
    fn from(entity: EventWithOrganizerEntity) -> Self {
        Self {
            event: Event {
                id: entity.id,
                title: entity.title,
                description: entity.description,
                date: entity.date,
                location: entity.location,
                organizer_id: entity.organizer_id,
                created_at: entity.created_at,
                updated_at: entity.updated_at,
            },
            organizer_username: entity.organizer_username,
            registration_count: entity.registration_count,
        }
    }
}
