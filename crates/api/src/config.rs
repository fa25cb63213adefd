use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Session token configuration
    pub jwt: JwtAuthConfig,
    /// Session cookie attributes
    #[serde(default)]
    pub cookie: CookieConfig,
    /// Registration confirmation email configuration
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool settings in the form the persistence crate expects.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Per-client limit on form submissions; 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Send Strict-Transport-Security. Only enable behind TLS.
    #[serde(default)]
    pub hsts_enabled: bool,

    /// Key rate limits on `X-Forwarded-For` / `X-Real-IP` instead of the
    /// peer address. Only enable behind a proxy that overwrites them.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: default_rate_limit(),
            hsts_enabled: false,
            trust_proxy_headers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret for signing session tokens (at least 32 bytes)
    pub secret: String,

    /// Session lifetime in seconds (default: 1209600 = 2 weeks)
    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Add the Secure attribute (requires HTTPS)
    #[serde(default)]
    pub secure: bool,

    /// SameSite attribute: Strict, Lax or None
    #[serde(default = "default_same_site")]
    pub same_site: String,

    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
            same_site: default_same_site(),
            path: default_cookie_path(),
        }
    }
}

/// Email configuration for registration confirmations.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email sending is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: smtp, or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// STARTTLS on submission; disable only for local test relays
    #[serde(default = "default_smtp_tls")]
    pub smtp_use_tls: bool,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_use_tls: default_smtp_tls(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_rate_limit() -> u32 {
    60
}

fn default_session_expiry() -> i64 {
    1209600 // 2 weeks
}

fn default_jwt_leeway() -> u64 {
    30
}

fn default_cookie_name() -> String {
    "eventboard_session".to_string()
}

fn default_same_site() -> String {
    "Lax".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_sender_email() -> String {
    "noreply@eventboard.local".to_string()
}

fn default_sender_name() -> String {
    "Event Board".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Defaults used by [`Config::load_for_test`]; mirrors `config/default.toml`.
const TEST_DEFAULTS: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 8000
    request_timeout_secs = 30

    [database]
    url = ""
    max_connections = 5
    min_connections = 1
    connect_timeout_secs = 10
    idle_timeout_secs = 600

    [logging]
    level = "info"
    format = "pretty"

    [security]
    rate_limit_per_minute = 0
    hsts_enabled = false
    trust_proxy_headers = false

    [jwt]
    secret = "test-secret-for-session-tokens-0123456789"
    session_expiry_secs = 3600
    leeway_secs = 0

    [cookie]
    name = "eventboard_session"
    secure = false
    same_site = "Lax"
    path = "/"

    [email]
    enabled = false
    provider = "console"
    sender_email = "test@example.com"
    sender_name = "Test"
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with EB__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("EB").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a configuration from embedded defaults plus overrides, without
    /// touching the filesystem or the environment. Not validated.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(TEST_DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "EB__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "EB__JWT__SECRET environment variable must be set".to_string(),
            ));
        }

        if self.jwt.secret.len() < shared::jwt::MIN_SECRET_LEN {
            return Err(ConfigValidationError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if !matches!(self.cookie.same_site.as_str(), "Strict" | "Lax" | "None") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "cookie.same_site must be Strict, Lax or None, got {}",
                self.cookie.same_site
            )));
        }

        if self.email.enabled && !matches!(self.email.provider.as_str(), "console" | "smtp") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Unknown email provider: {}",
                self.email.provider
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigValidationError::InvalidValue(format!("server address: {}", e)))
    }
}
