//! Session cookie handling.
//!
//! The session token lives in a single HttpOnly cookie; these helpers build
//! the `Set-Cookie` values and read the token back from requests.

use axum::http::{header::COOKIE, HeaderMap};

use crate::config::CookieConfig;

/// Cookie helper for the session cookie.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    config: CookieConfig,
    /// Session lifetime in seconds (from JWT config)
    max_age_secs: i64,
}

impl CookieHelper {
    pub fn new(config: CookieConfig, max_age_secs: i64) -> Self {
        Self {
            config,
            max_age_secs,
        }
    }

    /// Build a Set-Cookie header value carrying the session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        let cookie = format!(
            "{}={}; Path={}; Max-Age={}",
            self.config.name, token, self.config.path, self.max_age_secs
        );
        self.with_attributes(cookie)
    }

    /// Build a Set-Cookie header value that removes the session cookie.
    pub fn build_clear_cookie(&self) -> String {
        let cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.config.name, self.config.path
        );
        self.with_attributes(cookie)
    }

    /// Extract a cookie value from request headers by name.
    pub fn extract_cookie<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|cookie_header| cookie_header.split(';'))
            .map(str::trim)
            .find_map(|cookie| {
                let (cookie_name, cookie_value) = cookie.split_once('=')?;
                (cookie_name == name && !cookie_value.is_empty()).then_some(cookie_value)
            })
    }

    /// The session token from the request, if any.
    pub fn extract_session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.extract_cookie(headers, &self.config.name)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly");

        if self.config.secure {
            cookie.push_str("; Secure");
        }

        cookie.push_str(&format!("; SameSite={}", self.config.same_site));
        cookie
    }
}
