//! Email delivery for registration confirmations.
//!
//! Supports two providers:
//! - `console`: Logs emails (development)
//! - `smtp`: Sends via an SMTP relay using `lettre`

use async_trait::async_trait;
use domain::services::{Notifier, NotifyError};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    BuildFailed(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidAddress(addr) => NotifyError::InvalidRecipient(addr),
            other => NotifyError::Delivery(other.to_string()),
        }
    }
}

/// Plain-text email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

/// Email service backing the registration notifier.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    /// Creates the service. The SMTP transport is built once and reused; it
    /// connects lazily on first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let transport = if config.enabled && config.provider == "smtp" {
            Some(build_transport(&config)?)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message),
            "smtp" => self.send_smtp(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Console provider - logs the message instead of sending it.
    fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            from = %self.config.sender_email,
            subject = %message.subject,
            body = %message.body_text,
            "Email (console provider)"
        );
        Ok(())
    }

    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        let transport = self.transport.as_ref().ok_or(EmailError::NotConfigured)?;
        let email = self.build_message(&message)?;

        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        info!(to = %message.to, subject = %message.subject, "Email sent via SMTP");
        Ok(())
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let from: Mailbox = format!("{} <{}>", self.config.sender_name, self.config.sender_email)
            .parse()
            .map_err(|_| EmailError::InvalidAddress(self.config.sender_email.clone()))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(message.to.clone()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body_text.clone())
            .map_err(|e| EmailError::BuildFailed(e.to_string()))
    }
}

fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    if config.smtp_host.is_empty() {
        return Err(EmailError::NotConfigured);
    }

    let mut builder = if config.smtp_use_tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::SendFailed(format!("SMTP relay error: {}", e)))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };
    builder = builder.port(config.smtp_port);

    if !config.smtp_username.is_empty() {
        builder = builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ));
    }

    Ok(builder.build())
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        EmailService::send(
            self,
            EmailMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                body_text: body.to_string(),
            },
        )
        .await
        .map_err(NotifyError::from)
    }
}
