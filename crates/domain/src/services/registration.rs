//! Registration workflow.
//!
//! Records a user's registration for an event at most once and sends a single
//! confirmation for the registration that was actually created. The
//! registration is persisted before the confirmation is attempted; a failed
//! delivery is logged and reported in the outcome but never undoes it.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::notification::Notifier;
use crate::models::{Event, NotificationStatus, Registration, RegistrationOutcome, User};

/// Error type for the registration workflow.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Registration store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage operations the workflow needs.
#[async_trait::async_trait]
pub trait RegistrationStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, Self::Error>;

    async fn is_registered(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, Self::Error>;

    /// Inserts the registration unless the pair already exists.
    ///
    /// Returns `None` when a concurrent request won the race.
    async fn insert_registration(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Registration>, Self::Error>;
}

/// Subject and body of the confirmation message.
pub fn confirmation_message(event: &Event) -> (String, String) {
    let subject = format!("Registration Confirmation for {}", event.title);
    let body = format!(
        "You have successfully registered for {title}.\n\n\
         Event: {title}\n\
         Location: {location}\n\
         Date: {date}\n",
        title = event.title,
        location = event.location,
        date = event.date.format("%Y-%m-%d %H:%M"),
    );
    (subject, body)
}

/// Idempotent registration with a best-effort confirmation.
pub struct RegistrationService<S, N: Notifier + ?Sized> {
    store: S,
    notifier: Arc<N>,
}

impl<S, N> RegistrationService<S, N>
where
    S: RegistrationStore,
    N: Notifier + ?Sized,
{
    pub fn new(store: S, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Registers `user` for the event.
    ///
    /// The existence check runs before any mutation; the insert itself also
    /// tolerates a duplicate so two racing requests still yield one record
    /// and one message.
    pub async fn register(
        &self,
        user: &User,
        event_id: Uuid,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let event = self
            .store
            .find_event(event_id)
            .await
            .map_err(store_error)?
            .ok_or(RegistrationError::EventNotFound(event_id))?;

        if self
            .store
            .is_registered(user.id, event.id)
            .await
            .map_err(store_error)?
        {
            tracing::debug!(user_id = %user.id, event_id = %event.id, "Already registered");
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let registration = match self
            .store
            .insert_registration(user.id, event.id)
            .await
            .map_err(store_error)?
        {
            Some(registration) => registration,
            None => {
                tracing::debug!(
                    user_id = %user.id,
                    event_id = %event.id,
                    "Registration inserted concurrently"
                );
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
        };

        tracing::info!(
            user_id = %user.id,
            event_id = %event.id,
            registration_id = %registration.id,
            "User registered for event"
        );

        let (subject, body) = confirmation_message(&event);
        let notification = match self.notifier.send(&user.email, &subject, &body).await {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    event_id = %event.id,
                    error = %e,
                    "Failed to send registration confirmation"
                );
                NotificationStatus::Failed(e.to_string())
            }
        };

        Ok(RegistrationOutcome::Registered {
            registration,
            notification,
        })
    }
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> RegistrationError {
    RegistrationError::Store(Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification::RecordingNotifier;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Error)]
    #[error("store unavailable")]
    struct StoreDown;

    /// In-memory store. `race` makes the next insert report a conflict.
    #[derive(Default)]
    struct MemoryStore {
        events: HashMap<Uuid, Event>,
        registrations: Mutex<Vec<Registration>>,
        race: bool,
        down: bool,
    }

    impl MemoryStore {
        fn with_event(event: Event) -> Self {
            let mut store = Self::default();
            store.events.insert(event.id, event);
            store
        }

        fn count(&self) -> usize {
            self.registrations.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl<'a> RegistrationStore for &'a MemoryStore {
        type Error = StoreDown;

        async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreDown> {
            if self.down {
                return Err(StoreDown);
            }
            Ok(self.events.get(&event_id).cloned())
        }

        async fn is_registered(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, StoreDown> {
            Ok(self
                .registrations
                .lock()
                .unwrap()
                .iter()
                .any(|r| r.user_id == user_id && r.event_id == event_id))
        }

        async fn insert_registration(
            &self,
            user_id: Uuid,
            event_id: Uuid,
        ) -> Result<Option<Registration>, StoreDown> {
            if self.race {
                return Ok(None);
            }
            let registration = Registration {
                id: Uuid::new_v4(),
                user_id,
                event_id,
                registered_at: Utc::now(),
            };
            self.registrations.lock().unwrap().push(registration.clone());
            Ok(Some(registration))
        }
    }

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn test_event(organizer: &User) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Test Event".to_string(),
            description: "Test Description".to_string(),
            date: Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap(),
            location: "Test Location".to_string(),
            organizer_id: organizer.id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_confirmation_message() {
        let event = test_event(&user("user1"));
        let (subject, body) = confirmation_message(&event);

        assert_eq!(subject, "Registration Confirmation for Test Event");
        assert!(body.contains("You have successfully registered for Test Event"));
        assert!(body.contains("Test Location"));
        assert!(body.contains("2024-12-31 12:00"));
    }

    #[tokio::test]
    async fn test_first_registration_sends_one_confirmation() {
        let user1 = user("user1");
        let user2 = user("user2");
        let event = test_event(&user1);
        let store = MemoryStore::with_event(event.clone());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());

        let outcome = service.register(&user2, event.id).await.unwrap();

        match outcome {
            RegistrationOutcome::Registered {
                registration,
                notification,
            } => {
                assert_eq!(registration.user_id, user2.id);
                assert_eq!(registration.event_id, event.id);
                assert_eq!(notification, NotificationStatus::Sent);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.count(), 1);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user2@example.com");
        assert_eq!(sent[0].subject, "Registration Confirmation for Test Event");
    }

    #[tokio::test]
    async fn test_repeat_registration_is_noop() {
        let user1 = user("user1");
        let user2 = user("user2");
        let event = test_event(&user1);
        let store = MemoryStore::with_event(event.clone());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());

        service.register(&user2, event.id).await.unwrap();
        for _ in 0..3 {
            let outcome = service.register(&user2, event.id).await.unwrap();
            assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
        }

        assert_eq!(store.count(), 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_separate_users_each_get_one() {
        let organizer = user("user1");
        let event = test_event(&organizer);
        let store = MemoryStore::with_event(event.clone());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());

        service.register(&user("user2"), event.id).await.unwrap();
        service.register(&user("user3"), event.id).await.unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let store = MemoryStore::default();
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());
        let missing = Uuid::new_v4();

        let result = service.register(&user("user2"), missing).await;

        assert!(matches!(result, Err(RegistrationError::EventNotFound(id)) if id == missing));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_registration() {
        let user1 = user("user1");
        let user2 = user("user2");
        let event = test_event(&user1);
        let store = MemoryStore::with_event(event.clone());
        let notifier = Arc::new(RecordingNotifier::failing());
        let service = RegistrationService::new(&store, notifier.clone());

        let outcome = service.register(&user2, event.id).await.unwrap();
        assert!(matches!(
            outcome,
            RegistrationOutcome::Registered {
                notification: NotificationStatus::Failed(_),
                ..
            }
        ));
        assert_eq!(store.count(), 1);

        let retry = service.register(&user2, event.id).await.unwrap();
        assert_eq!(retry, RegistrationOutcome::AlreadyRegistered);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_lost_insert_race_sends_nothing() {
        let user1 = user("user1");
        let event = test_event(&user1);
        let mut store = MemoryStore::with_event(event.clone());
        store.race = true;
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());

        let outcome = service.register(&user("user2"), event.id).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MemoryStore::default();
        store.down = true;
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RegistrationService::new(&store, notifier.clone());

        let result = service.register(&user("user2"), Uuid::new_v4()).await;
        assert!(matches!(result, Err(RegistrationError::Store(_))));
    }

    #[tokio::test]
    async fn test_works_with_dyn_notifier() {
        let user1 = user("user1");
        let event = test_event(&user1);
        let store = MemoryStore::with_event(event.clone());
        let recording = Arc::new(RecordingNotifier::new());
        let notifier: Arc<dyn Notifier> = recording.clone();
        let service = RegistrationService::new(&store, notifier);

        service.register(&user("user2"), event.id).await.unwrap();
        assert_eq!(recording.sent().len(), 1);
    }
}
