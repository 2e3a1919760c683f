//! Configuration management module
//!
//! Handles loading and validating application configuration from environment variables.
//! Uses the `config` crate with `dotenvy` for .env file support.

use config::{ConfigError, Environment as ConfigEnvironment, File};
use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    LoadError(#[from] ConfigError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Environment types
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

fn default_database_url() -> String {
    "postgresql://localhost:5432/cabin_reservations".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> u32 {
    5
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
        }
    }
}

/// SMTP email configuration (outbound booking confirmations only)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SmtpConfig {
    /// SMTP server host
    pub host: Option<String>,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username
    pub user: Option<String>,

    /// SMTP password
    pub pass: Option<String>,

    /// Use TLS for SMTP connection
    #[serde(default = "default_smtp_tls")]
    pub use_tls: bool,

    /// "From" address used on booking confirmation emails
    #[serde(default = "default_smtp_from")]
    pub from_address: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_smtp_from() -> String {
    "reservations@example-cabins.test".to_string()
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.user.is_some() && self.pass.is_some()
    }
}

/// Calendar gateway configuration (external shared-availability calendar)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CalendarConfig {
    /// Base URL of the calendar gateway service
    pub base_url: Option<String>,

    /// API key used to authenticate with the calendar gateway
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_calendar_timeout")]
    pub timeout_secs: u64,
}

fn default_calendar_timeout() -> u64 {
    10
}

impl CalendarConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }
}

/// Payment gateway configuration (deposit/charge processing and webhooks)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PaymentConfig {
    /// Base URL of the payment gateway service
    pub base_url: Option<String>,

    /// Secret key used to authenticate outbound requests
    pub secret_key: Option<String>,

    /// Shared secret used to verify inbound webhook signatures
    pub webhook_secret: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_payment_timeout")]
    pub timeout_secs: u64,
}

fn default_payment_timeout() -> u64 {
    15
}

impl PaymentConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.secret_key.is_some()
    }
}

/// Business rules configuration (timezone, hold duration, currency)
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessConfig {
    /// IANA timezone name all business-day calculations are anchored to
    #[serde(default = "default_business_timezone")]
    pub timezone: String,

    /// Hold duration in seconds before an uncommitted hold expires
    #[serde(default = "default_hold_duration_secs")]
    pub hold_duration_secs: u64,

    /// ISO 4217 currency code used for all quoted and booked prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Directory containing per-cabin photo subfolders, served read-only
    /// at `/images/:short_code/...`
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
}

fn default_images_dir() -> String {
    "assets/cabins".to_string()
}

fn default_business_timezone() -> String {
    "Asia/Jerusalem".to_string()
}

fn default_hold_duration_secs() -> u64 {
    900
}

fn default_currency() -> String {
    "ILS".to_string()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            timezone: default_business_timezone(),
            hold_duration_secs: default_hold_duration_secs(),
            currency: default_currency(),
            images_dir: default_images_dir(),
        }
    }
}

/// Admin surface configuration (shared-secret header guard)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Value callers must present in the `X-Admin-Api-Key` header
    pub api_key: Option<String>,
}

impl AdminConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Frontend URL for CORS
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    4010
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:4010".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            frontend_url: default_frontend_url(),
            log_level: default_log_level(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Rate limit window in milliseconds
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_ms: u64,

    /// Maximum requests per rate limit window
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max_requests: u32,
}

fn default_rate_limit_window() -> u64 {
    900_000 // 15 minutes
}

fn default_rate_limit_max() -> u32 {
    10_000
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_ms: default_rate_limit_window(),
            rate_limit_max_requests: default_rate_limit_max(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Outbound email configuration
    #[serde(default)]
    pub email: SmtpConfig,

    /// Calendar gateway configuration
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Payment gateway configuration
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Business rules configuration
    #[serde(default)]
    pub business: BusinessConfig,

    /// Admin surface configuration
    #[serde(default)]
    pub admin: AdminConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Settings {
    /// Load settings from environment variables and optional config files
    pub fn new() -> Result<Self, ConfigurationError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Build configuration
        let settings = config::Config::builder()
            // Start with defaults
            .set_default("environment", "development")?
            .set_default("server.port", 4010)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.frontend_url", "http://localhost:4010")?
            .set_default("server.log_level", "info")?
            .set_default(
                "database.url",
                "postgresql://localhost:5432/cabin_reservations",
            )?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connection_timeout_secs", 30)?
            .set_default("redis.url", "redis://localhost:6379")?
            .set_default("redis.pool_size", 5)?
            .set_default("email.port", 587)?
            .set_default("email.use_tls", true)?
            .set_default("email.from_address", "reservations@example-cabins.test")?
            .set_default("calendar.timeout_secs", 10)?
            .set_default("payment.timeout_secs", 15)?
            .set_default("business.timezone", "Asia/Jerusalem")?
            .set_default("business.hold_duration_secs", 900)?
            .set_default("business.currency", "ILS")?
            .set_default("business.images_dir", "assets/cabins")?
            .set_default("security.rate_limit_window_ms", 900_000)?
            .set_default("security.rate_limit_max_requests", 10_000)?
            // Load from config file if present
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with prefix mapping
            .add_source(
                ConfigEnvironment::default()
                    .separator("__")
                    // Map flat env vars to nested structure
                    .try_parsing(true),
            )
            // Manual overrides from specific environment variables
            .set_override_option(
                "environment",
                env::var("RUST_ENV").or_else(|_| env::var("NODE_ENV")).ok(),
            )?
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("server.frontend_url", env::var("FRONTEND_URL").ok())?
            .set_override_option("server.log_level", env::var("LOG_LEVEL").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", env::var("REDIS_URL").ok())?
            .set_override_option("email.host", env::var("SMTP_HOST").ok())?
            .set_override_option("email.port", env::var("SMTP_PORT").ok())?
            .set_override_option("email.user", env::var("SMTP_USER").ok())?
            .set_override_option("email.pass", env::var("SMTP_PASS").ok())?
            .set_override_option("email.from_address", env::var("SMTP_FROM").ok())?
            .set_override_option("calendar.base_url", env::var("CALENDAR_BASE_URL").ok())?
            .set_override_option("calendar.api_key", env::var("CALENDAR_API_KEY").ok())?
            .set_override_option("payment.base_url", env::var("PAYMENT_BASE_URL").ok())?
            .set_override_option("payment.secret_key", env::var("PAYMENT_SECRET_KEY").ok())?
            .set_override_option(
                "payment.webhook_secret",
                env::var("PAYMENT_WEBHOOK_SECRET").ok(),
            )?
            .set_override_option("business.timezone", env::var("BUSINESS_TIMEZONE").ok())?
            .set_override_option(
                "business.hold_duration_secs",
                env::var("HOLD_DURATION_SECS").ok(),
            )?
            .set_override_option("business.currency", env::var("BUSINESS_CURRENCY").ok())?
            .set_override_option("business.images_dir", env::var("CABIN_IMAGES_DIR").ok())?
            .set_override_option("admin.api_key", env::var("ADMIN_API_KEY").ok())?
            .set_override_option(
                "security.rate_limit_window_ms",
                env::var("RATE_LIMIT_WINDOW_MS").ok(),
            )?
            .set_override_option(
                "security.rate_limit_max_requests",
                env::var("RATE_LIMIT_MAX_REQUESTS").ok(),
            )?
            .build()?;

        let settings: Settings = settings.try_deserialize()?;

        // Validate the settings
        settings.validate()?;

        Ok(settings)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigurationError> {
        let mut errors: Vec<String> = Vec::new();

        if self.environment == Environment::Production {
            if self.admin.api_key.is_none() {
                errors.push("ADMIN_API_KEY must be set in production".to_string());
            }
            if let Some(key) = &self.admin.api_key {
                if key.len() < 32 {
                    errors.push(format!(
                        "ADMIN_API_KEY must be at least 32 characters in production (got {})",
                        key.len()
                    ));
                }
                let weak_keys = ["changeme", "secret", "admin", "123456"];
                if weak_keys.contains(&key.as_str()) {
                    errors.push("ADMIN_API_KEY appears to be a default value".to_string());
                }
            }

            if self.database.url.contains("localhost") {
                errors.push(
                    "Production environment should not use localhost database".to_string(),
                );
            }
        }

        // Validate port range
        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        // Validate database URL format
        if !self.database.url.starts_with("postgresql://")
            && !self.database.url.starts_with("postgres://")
        {
            errors.push("DATABASE_URL must be a valid PostgreSQL connection string".to_string());
        }

        // Validate Redis URL format
        if !self.redis.url.starts_with("redis://") && !self.redis.url.starts_with("rediss://") {
            errors.push("REDIS_URL must be a valid Redis connection string".to_string());
        }

        // Validate the business timezone parses as a real IANA zone
        if self.business.timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(format!(
                "BUSINESS_TIMEZONE '{}' is not a recognized IANA timezone",
                self.business.timezone
            ));
        }

        if self.business.hold_duration_secs == 0 {
            errors.push("HOLD_DURATION_SECS cannot be 0".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigurationError::ValidationError(errors.join("; ")));
        }

        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in staging
    pub fn is_staging(&self) -> bool {
        self.environment == Environment::Staging
    }

    /// Get allowed CORS origins based on environment
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![self.server.frontend_url.clone()];

        // In development, also allow localhost variants
        if self.is_development() {
            origins.push("http://localhost:3000".to_string());
            origins.push("http://localhost:3001".to_string());
            origins.push("http://localhost:4010".to_string());
            origins.push("http://127.0.0.1:3000".to_string());
            origins.push("http://127.0.0.1:4010".to_string());
        }

        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(
            Environment::from("production".to_string()),
            Environment::Production
        );
        assert_eq!(
            Environment::from("staging".to_string()),
            Environment::Staging
        );
        assert_eq!(
            Environment::from("development".to_string()),
            Environment::Development
        );
        assert_eq!(
            Environment::from("unknown".to_string()),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Staging.to_string(), "staging");
        assert_eq!(Environment::Development.to_string(), "development");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Development);
        assert_eq!(settings.server.port, 4010);
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.redis.pool_size, 5);
        assert_eq!(settings.business.timezone, "Asia/Jerusalem");
        assert_eq!(settings.business.hold_duration_secs, 900);
    }

    #[test]
    fn test_smtp_configured() {
        let mut config = SmtpConfig::default();
        assert!(!config.is_configured());

        config.host = Some("smtp.example.com".to_string());
        config.user = Some("user".to_string());
        config.pass = Some("pass".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_calendar_configured() {
        let mut config = CalendarConfig::default();
        assert!(!config.is_configured());
        config.base_url = Some("https://calendar.example.test".to_string());
        config.api_key = Some("key".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_payment_configured() {
        let mut config = PaymentConfig::default();
        assert!(!config.is_configured());
        config.base_url = Some("https://payments.example.test".to_string());
        config.secret_key = Some("secret".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_admin_configured() {
        let mut config = AdminConfig::default();
        assert!(!config.is_configured());
        config.api_key = Some("key".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_cors_origins_development() {
        let mut settings = Settings::default();
        settings.environment = Environment::Development;
        settings.server.frontend_url = "http://localhost:3000".to_string();

        let origins = settings.cors_origins();
        assert!(origins.contains(&"http://localhost:3000".to_string()));
        assert!(origins.contains(&"http://localhost:4010".to_string()));
    }

    #[test]
    fn test_cors_origins_production() {
        let mut settings = Settings::default();
        settings.environment = Environment::Production;
        settings.server.frontend_url = "https://cabins.example.com".to_string();

        let origins = settings.cors_origins();
        assert_eq!(origins.len(), 1);
        assert!(origins.contains(&"https://cabins.example.com".to_string()));
    }

    #[test]
    fn test_business_timezone_validation_rejects_garbage() {
        let mut settings = Settings::default();
        settings.business.timezone = "Not/A_Zone".to_string();
        assert!(settings.validate().is_err());
    }
}
