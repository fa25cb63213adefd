//! Current-user extractors.
//!
//! The session token is read from the session cookie, or from an
//! `Authorization: Bearer` header for non-browser clients. The token only
//! names the user; the account itself is loaded from the database on every
//! request so deleted users lose access immediately.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Method},
};
use domain::models::User;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;

/// The logged-in user. Rejects with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in user, if any. Never rejects on a bad or missing session.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

/// `next` values are honoured only for local absolute paths.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(|c| c.is_control())
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Where to return after logging in. Only safe to replay GETs.
fn next_for(parts: &Parts) -> String {
    if parts.method == Method::GET {
        parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    } else {
        "/".to_string()
    }
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let token = match state
        .cookies
        .extract_session_token(&parts.headers)
        .or_else(|| bearer_token(parts))
    {
        Some(token) => token,
        None => return Ok(None),
    };

    let user_id = match state.sessions.validate(token).and_then(|c| c.user_id()) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            return Ok(None);
        }
    };

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?;
    Ok(user.map(Into::into))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(CurrentUser(user.clone()));
        }

        match resolve_user(parts, state).await? {
            Some(user) => {
                parts.extensions.insert(user.clone());
                Ok(CurrentUser(user))
            }
            None => Err(ApiError::LoginRequired {
                next: next_for(parts),
            }),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(OptionalUser(Some(user.clone())));
        }

        let user = resolve_user(parts, state).await?;
        if let Some(ref user) = user {
            parts.extensions.insert(user.clone());
        }
        Ok(OptionalUser(user))
    }
}
