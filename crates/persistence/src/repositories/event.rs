//! Event repository for database operations.

use chrono::Utc;
use domain::models::EventInput;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventEntity, EventWithOrganizerEntity};
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str =
    "id, title, description, date, location, organizer_id, created_at, updated_at";

/// Escapes `ILIKE` wildcards so the filter matches literally, and wraps it
/// for a substring match.
pub fn like_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for events.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event owned by `organizer_id`.
    pub async fn create(
        &self,
        organizer_id: Uuid,
        input: &EventInput,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let now = Utc::now();
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (title, description, date, location, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.date)
        .bind(&input.location)
        .bind(organizer_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event with its organizer's username and registration count.
    pub async fn find_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithOrganizerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_detail");
        let result = sqlx::query_as::<_, EventWithOrganizerEntity>(
            r#"
            SELECT e.id, e.title, e.description, e.date, e.location, e.organizer_id,
                   e.created_at, e.updated_at,
                   u.username AS organizer_username,
                   (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id)
                       AS registration_count
            FROM events e
            JOIN users u ON u.id = e.organizer_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List events, newest date first, optionally filtered by a
    /// case-insensitive title substring.
    pub async fn list(&self, title_filter: Option<&str>) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = match title_filter {
            Some(filter) => {
                sqlx::query_as::<_, EventEntity>(&format!(
                    r#"
                    SELECT {EVENT_COLUMNS}
                    FROM events
                    WHERE title ILIKE $1 ESCAPE '\'
                    ORDER BY date DESC, id
                    "#
                ))
                .bind(like_pattern(filter))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, EventEntity>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY date DESC, id"
                ))
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();
        result
    }

    /// Replace the editable fields. The organizer is never touched.
    pub async fn update(
        &self,
        id: Uuid,
        input: &EventInput,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_event");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events
            SET title = $2, description = $3, date = $4, location = $5, updated_at = $6
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.date)
        .bind(&input.location)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an event; its registrations go with it.
    /// Returns the number of rows affected (0 if not found).
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
