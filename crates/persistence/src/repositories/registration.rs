//! Registration repository for database operations.

use domain::models::{Event, Registration};
use domain::services::RegistrationStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventEntity, RegistrationEntity};
use crate::metrics::QueryTimer;
use crate::repositories::EventRepository;

/// Repository for event registrations.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Creates a new RegistrationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("registration_exists");
        let result: Result<(bool,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM event_registrations WHERE user_id = $1 AND event_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.0)
    }

    /// Insert unless the (user, event) pair already exists.
    /// Returns `None` when the row was already there.
    pub async fn insert(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<RegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_registration");
        let result = sqlx::query_as::<_, RegistrationEntity>(
            r#"
            INSERT INTO event_registrations (user_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING id, user_id, event_id, registered_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    fn events(&self) -> EventRepository {
        EventRepository::new(self.pool.clone())
    }
}

#[async_trait::async_trait]
impl RegistrationStore for RegistrationRepository {
    type Error = sqlx::Error;

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let entity: Option<EventEntity> = self.events().find_by_id(event_id).await?;
        Ok(entity.map(Into::into))
    }

    async fn is_registered(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, sqlx::Error> {
        self.exists(user_id, event_id).await
    }

    async fn insert_registration(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Registration>, sqlx::Error> {
        Ok(self.insert(user_id, event_id).await?.map(Into::into))
    }
}
