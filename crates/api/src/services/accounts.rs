//! Account service: sign-up and credential checks.

use domain::models::User;
use persistence::repositories::{UserRepository, EMAIL_UNIQUE_INDEX};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    /// Maps a failed user insert; unique violations name the taken field.
    pub fn from_insert(error: sqlx::Error) -> Self {
        if !persistence::db::is_unique_violation(&error) {
            return AccountError::Database(error);
        }
        Self::taken(persistence::db::violated_constraint(&error))
    }

    fn taken(constraint: Option<&str>) -> Self {
        match constraint {
            Some(EMAIL_UNIQUE_INDEX) => AccountError::EmailTaken,
            _ => AccountError::UsernameTaken,
        }
    }
}

/// Account service.
pub struct AccountService {
    users: UserRepository,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Creates an account. The form is expected to be validated already.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        if self.users.username_exists(username).await? {
            return Err(AccountError::UsernameTaken);
        }
        if self.users.email_exists(email).await? {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = hash_password(password)?;

        // A concurrent sign-up can still win the insert.
        let entity = self
            .users
            .create_user(username, email, &password_hash)
            .await
            .map_err(AccountError::from_insert)?;

        tracing::info!(user_id = %entity.id, username = %entity.username, "User signed up");
        Ok(entity.into())
    }

    /// Checks a username/password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let Some(entity) = self.users.find_by_username(username).await? else {
            // Hash anyway so unknown usernames take as long as wrong passwords.
            let _ = hash_password(password);
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(password, &entity.password_hash)? {
            tracing::debug!(user_id = %entity.id, "Password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(entity.into())
    }
}
