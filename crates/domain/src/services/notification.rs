//! Outbound notification seam.
//!
//! The registration workflow sends its confirmation through [`Notifier`]; the
//! api crate provides the email-backed implementation.

use std::sync::Mutex;
use thiserror::Error;

/// Error type for notification delivery.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// A message handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notification sender trait.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message to one recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that keeps every message in memory.
///
/// Used by tests to count and inspect confirmations.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails. Attempts are still recorded.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            simulate_failure: true,
        }
    }

    /// Messages received so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(Notification {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        }

        if self.simulate_failure {
            tracing::warn!(to = %to, "Recording notifier simulating failure");
            return Err(NotifyError::Delivery("Simulated failure".to_string()));
        }

        Ok(())
    }
}
