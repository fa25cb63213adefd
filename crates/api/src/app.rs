use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::Notifier;
use shared::jwt::{JwtError, SessionTokens};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{accounts, events, health};
use crate::services::{CookieHelper, EmailError, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub sessions: SessionTokens,
    pub cookies: CookieHelper,
    /// Delivers registration confirmations.
    pub notifier: Arc<dyn Notifier>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Session token setup failed: {0}")]
    Session(#[from] JwtError),

    #[error("Email setup failed: {0}")]
    Email(#[from] EmailError),
}

/// Builds the router with the configured email service as notifier.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, StartupError> {
    let email = EmailService::new(config.email.clone())?;
    if !email.is_enabled() {
        tracing::warn!("Email disabled; registration confirmations will not be sent");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(email);
    create_app_with_notifier(config, pool, notifier)
}

pub fn create_app_with_notifier(
    config: Config,
    pool: PgPool,
    notifier: Arc<dyn Notifier>,
) -> Result<Router, StartupError> {
    let config = Arc::new(config);

    let sessions = SessionTokens::new(
        &config.jwt.secret,
        config.jwt.session_expiry_secs,
        config.jwt.leeway_secs,
    )?;
    let cookies = CookieHelper::new(config.cookie.clone(), config.jwt.session_expiry_secs);

    // Disabled when rate_limit_per_minute is 0
    let rate_limiter = RateLimiterState::new(
        config.security.rate_limit_per_minute,
        config.security.trust_proxy_headers,
    )
    .map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        sessions,
        cookies,
        notifier,
        rate_limiter,
    };

    let event_routes = Router::new()
        .route("/", get(events::index))
        .route(
            "/events/create",
            get(events::create_form).post(events::create),
        )
        .route("/events/:id", get(events::detail))
        .route(
            "/events/:id/update",
            get(events::update_form).post(events::update),
        )
        .route(
            "/events/:id/delete",
            get(events::delete_form).post(events::delete),
        )
        .route("/events/:id/register", post(events::register));

    let account_routes = Router::new()
        .route(
            "/accounts/signup",
            get(accounts::signup_form).post(accounts::signup),
        )
        .route(
            "/accounts/login",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/accounts/logout", post(accounts::logout));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(event_routes)
        .merge(account_routes)
        .merge(public_routes)
        // Route layers run after matching, so MatchedPath is available
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn(metrics_middleware))
        .fallback(not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Page not found".into())
}
