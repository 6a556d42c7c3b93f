use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_at_least_64_characters_long_for_testing";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT signing secret
    #[validate(length(min = 32, message = "jwt_secret must be at least 32 characters"))]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,

    /// Server bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    pub cors_allow_credentials: bool,

    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    /// Base URL of the hosted provisioning functions (create-user,
    /// reset-password). Unset means credentials are managed locally.
    #[serde(default)]
    pub provisioning_url: Option<String>,

    /// Service token for the provisioning functions
    #[serde(default)]
    pub provisioning_token: Option<String>,

    /// Upload endpoint for product media. Unset disables uploads.
    #[serde(default)]
    pub media_upload_url: Option<String>,

    /// Capacity of the domain event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_jwt_expiration() -> u64 {
    60 * 60
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_auth_issuer() -> String {
    "storeops-auth".to_string()
}
fn default_auth_audience() -> String {
    "storeops-api".to_string()
}
fn default_event_buffer() -> usize {
    1024
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

impl AppConfig {
    /// Minimal constructor for test harnesses and embedded use.
    pub fn new(
        database_url: String,
        jwt_secret: String,
        jwt_expiration: u64,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            cors_allowed_origins: None,
            cors_allow_credentials: false,
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            provisioning_url: None,
            provisioning_token: None,
            media_upload_url: None,
            event_buffer: default_event_buffer(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Permissive CORS is acceptable only outside production.
    pub fn should_allow_permissive_cors(&self) -> bool {
        !self.is_production()
    }

    fn validate_config(&self) -> Result<(), AppConfigError> {
        self.validate()
            .map_err(|e| AppConfigError::Validation(e.to_string()))?;

        if self.is_production() && self.jwt_secret == DEV_DEFAULT_JWT_SECRET {
            return Err(AppConfigError::Validation(
                "the development JWT secret must not be used in production".into(),
            ));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(AppConfigError::Validation(
                "db_min_connections exceeds db_max_connections".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration in layers:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{environment}.toml`
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let environment =
        std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", environment.clone())?
        .set_default("database_url", "sqlite://storeops.db?mode=rwc")?
        .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?;

    let default_file = Path::new(CONFIG_DIR).join("default.toml");
    if default_file.exists() {
        builder = builder.add_source(File::from(default_file));
    }

    let env_file = Path::new(CONFIG_DIR).join(format!("{environment}.toml"));
    if env_file.exists() {
        builder = builder.add_source(File::from(env_file));
    }

    let cfg: AppConfig = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    cfg.validate_config()?;
    info!(environment = %cfg.environment, "configuration loaded");
    Ok(cfg)
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}
