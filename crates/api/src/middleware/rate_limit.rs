//! Rate limiting middleware.
//!
//! Form submissions (POST) are limited per client address with a keyed
//! `governor` limiter. Page views are never limited.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::app::AppState;
use crate::error::ApiError;

/// Idle buckets are swept once every this many checks.
const PRUNE_INTERVAL: u64 = 1024;

/// Rate limiter state shared across all requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
    trust_proxy_headers: bool,
    checks: AtomicU64,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32, trust_proxy_headers: bool) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute,
            trust_proxy_headers,
            checks: AtomicU64::new(0),
        })
    }

    /// Check if a request from the given client should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.clock.now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Number of clients currently tracked.
    pub fn active_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Client key: the peer address, or the first `X-Forwarded-For` hop
    /// then `X-Real-IP` when proxy headers are trusted.
    fn client_key(&self, req: &Request<Body>) -> String {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let forwarded = if self.trust_proxy_headers {
            header("x-forwarded-for").or_else(|| header("x-real-ip"))
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("active_clients", &self.active_clients())
            .finish()
    }
}

/// Middleware that applies rate limiting to form submissions.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() != Method::POST {
        return next.run(req).await;
    }

    if let Some(ref rate_limiter) = state.rate_limiter {
        let client = rate_limiter.client_key(&req);
        if let Err(retry_after) = rate_limiter.check(&client) {
            tracing::warn!(
                client = %client,
                limit = rate_limiter.rate_limit_per_minute(),
                retry_after = retry_after,
                "Rate limit exceeded"
            );
            return ApiError::RateLimited { retry_after }.into_response();
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_app_with_notifier;
    use crate::config::Config;
    use axum::http::{header, StatusCode};
    use domain::services::RecordingNotifier;
    use sqlx::postgres::PgPoolOptions;
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    fn peer(req: &mut Request<Body>, ip: [u8; 4]) {
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 4000))));
    }

    #[test]
    fn test_zero_disables() {
        assert!(RateLimiterState::new(0, false).is_none());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1, false).unwrap();

        assert!(state.check("10.0.0.1").is_ok());
        let retry_after = state.check("10.0.0.1").unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_rate_limiter_clients_independent() {
        let state = RateLimiterState::new(1, false).unwrap();

        assert!(state.check("10.0.0.1").is_ok());
        assert!(state.check("10.0.0.2").is_ok());
        assert!(state.check("10.0.0.1").is_err());
        assert!(state.check("10.0.0.2").is_err());
    }

    #[test]
    fn test_rate_limiter_allows_quota() {
        let state = RateLimiterState::new(5, false).unwrap();
        for i in 0..5 {
            assert!(state.check("client").is_ok(), "Request {} should be allowed", i);
        }
        assert!(state.check("client").is_err());
    }

    #[test]
    fn test_idle_clients_are_swept() {
        // Refills within nanoseconds, so every bucket is idle after the sleep.
        let state = RateLimiterState::new(u32::MAX, false).unwrap();
        for i in 0..100 {
            state.check(&format!("10.0.{}.{}", i / 256, i % 256)).unwrap();
        }
        assert_eq!(state.active_clients(), 100);

        std::thread::sleep(Duration::from_millis(5));
        for _ in 100..PRUNE_INTERVAL {
            state.check("10.9.9.9").unwrap();
        }
        assert_eq!(state.active_clients(), 1);

        let debug = format!("{:?}", state);
        assert!(debug.contains("active_clients: 1"));
    }

    #[test]
    fn test_client_key_ignores_proxy_headers_by_default() {
        let state = RateLimiterState::new(10, false).unwrap();
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        peer(&mut req, [192, 0, 2, 1]);
        assert_eq!(state.client_key(&req), "192.0.2.1");

        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(state.client_key(&req), "unknown");
    }

    #[test]
    fn test_client_key_trusted_proxy_headers() {
        let state = RateLimiterState::new(10, true).unwrap();
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        peer(&mut req, [192, 0, 2, 1]);
        assert_eq!(state.client_key(&req), "203.0.113.7");

        let req = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(state.client_key(&req), "198.51.100.2");

        let mut req = Request::builder().body(Body::empty()).unwrap();
        peer(&mut req, [192, 0, 2, 1]);
        assert_eq!(state.client_key(&req), "192.0.2.1");
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_is_still_limited() {
        let config = Config::load_for_test(&[
            ("database.url", "postgres://eventboard@localhost/unused"),
            ("security.rate_limit_per_minute", "1"),
        ])
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let app = create_app_with_notifier(config, pool, Arc::new(RecordingNotifier::new()))
            .unwrap();

        let logout = |forwarded: &str| {
            let mut req = Request::builder()
                .method(Method::POST)
                .uri("/accounts/logout")
                .header("x-forwarded-for", forwarded)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::empty())
                .unwrap();
            peer(&mut req, [192, 0, 2, 50]);
            req
        };

        let first = app.clone().oneshot(logout("203.0.113.1")).await.unwrap();
        assert_eq!(first.status(), StatusCode::SEE_OTHER);

        let second = app.oneshot(logout("203.0.113.2")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
