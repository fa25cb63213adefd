use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use domain::services::RegistrationError;
use shared::jwt::JwtError;
use thiserror::Error;

use crate::templates;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session; the browser is sent to the login page.
    #[error("Login required")]
    LoginRequired { next: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited { retry_after: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::LoginRequired { next } => {
                return Redirect::to(&templates::login_url(&next)).into_response();
            }
            ApiError::Forbidden(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => msg,
            ApiError::RateLimited { retry_after } => {
                let body = templates::errors::error_page(
                    status,
                    "Too many requests. Please try again later.",
                );
                let mut response = (status, Html(body)).into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                return response;
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred.".to_string()
            }
        };

        (status, Html(templates::errors::error_page(status, &message))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::EventNotFound(_) => ApiError::NotFound("Event not found".into()),
            RegistrationError::Store(source) => match source.downcast::<sqlx::Error>() {
                Ok(db_err) => (*db_err).into(),
                Err(other) => ApiError::Internal(other.to_string()),
            },
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(format!("Session token error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_forbidden_is_403_html() {
        let response = ApiError::Forbidden("Only the organizer can edit this event.".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[test]
    fn test_not_found() {
        let response = ApiError::NotFound("Event not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_login_required_redirects() {
        let response = ApiError::LoginRequired {
            next: "/events/create".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=%2Fevents%2Fcreate"
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after: 7 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "7");
    }

    #[test]
    fn test_internal_hides_details() {
        let response = ApiError::Internal("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_registration_errors() {
        let error: ApiError = RegistrationError::EventNotFound(Uuid::new_v4()).into();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);

        let error: ApiError = RegistrationError::Store(Box::new(sqlx::Error::PoolTimedOut)).into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error: ApiError = RegistrationError::Store(Box::new(sqlx::Error::RowNotFound)).into();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }
}
