//! Application configuration module.
//! Handles environment variable loading, validation and defaults.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub cache: CacheSettings,
    pub refund: RefundSettings,
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// FLASHPAY API endpoint configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub protocol: String,
    pub host: String,
    pub api_version: String,
    pub secret_key: String,
    /// Outbound request timeout. These calls sit in checkout-critical-path
    /// requests, so the default is short.
    pub request_timeout: Duration,
    pub test_mode: bool,
    /// Prefix prepended to test-mode refund payment identifiers.
    pub test_prefix: String,
}

impl GatewayConfig {
    /// Base path of the payment API: `{protocol}://{host}/{version}/payment`.
    pub fn payment_base_url(&self) -> String {
        format!(
            "{}://{}/{}/payment",
            self.protocol, self.host, self.api_version
        )
    }
}

/// Payment snapshot cache settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub redis_url: String,
    /// Snapshot expiration. Default 7 days.
    pub ttl: Duration,
    pub max_connections: u32,
}

/// Refund confirmation poll settings.
#[derive(Debug, Clone)]
pub struct RefundSettings {
    /// Number of poll iterations before the soft timeout.
    pub poll_attempts: u32,
    /// Pause between poll iterations.
    pub poll_interval: Duration,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub enum LogFormat {
    Json,
    Plain,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            cache: CacheSettings::from_env()?,
            refund: RefundSettings::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.gateway.validate()?;
        self.refund.validate()?;

        Ok(())
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env_or(name, default)
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env_or("SERVER_HOST", "127.0.0.1"),
            port: parse_env("SERVER_PORT", "8000")?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            protocol: env_or("FLASHPAY_PROTOCOL", "https"),
            host: env::var("FLASHPAY_HOST")
                .map_err(|_| ConfigError::MissingVariable("FLASHPAY_HOST".to_string()))?,
            api_version: env_or("FLASHPAY_API_VERSION", "v2"),
            secret_key: env::var("FLASHPAY_SECRET_KEY")
                .map_err(|_| ConfigError::MissingVariable("FLASHPAY_SECRET_KEY".to_string()))?,
            request_timeout: Duration::from_secs(parse_env("FLASHPAY_REQUEST_TIMEOUT_SECS", "5")?),
            test_mode: env_or("FLASHPAY_TEST_MODE", "false").to_lowercase() == "true",
            test_prefix: env_or("FLASHPAY_TEST_PREFIX", "test"),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "FLASHPAY_HOST cannot be empty".to_string(),
            ));
        }
        if self.secret_key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "FLASHPAY_SECRET_KEY cannot be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "FLASHPAY_REQUEST_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl CacheSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CacheSettings {
            enabled: env_or("CACHE_ENABLED", "true").to_lowercase() == "true",
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            ttl: Duration::from_secs(parse_env("CACHE_TTL_SECS", "604800")?),
            max_connections: parse_env("CACHE_MAX_CONNECTIONS", "20")?,
        })
    }
}

impl RefundSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(RefundSettings {
            poll_attempts: parse_env("REFUND_POLL_ATTEMPTS", "10")?,
            poll_interval: Duration::from_millis(parse_env("REFUND_POLL_INTERVAL_MS", "2000")?),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "REFUND_POLL_ATTEMPTS cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RefundSettings {
    fn default() -> Self {
        Self {
            poll_attempts: 10,
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "plain").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        Ok(LoggingConfig {
            level: env_or("LOG_LEVEL", "info"),
            format,
        })
    }
}
