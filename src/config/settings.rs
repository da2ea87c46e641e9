//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Default TheBrain API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.thebrain.com";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// TheBrain API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// Credentials are not checked here; the API client reports missing
    /// credentials when it is constructed.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "api.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Applies overrides from the process environment.
    ///
    /// Reads `THEBRAIN_API_KEY`, `THEBRAIN_BRAIN_ID`, `THEBRAIN_API_URL` and
    /// `THEBRAIN_LOG_LEVEL`. Blank values are ignored.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides using `lookup` to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("THEBRAIN_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(brain) = lookup("THEBRAIN_BRAIN_ID") {
            self.api.brain_id = Some(brain);
        }
        if let Some(url) = lookup("THEBRAIN_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(level) = lookup("THEBRAIN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// Connection settings for the TheBrain API client.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// API base URL.
    /// Default: `https://api.thebrain.com`
    #[serde(default = "default_base_url")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Brain (workspace) identifier.
    #[serde(default)]
    pub brain_id: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transport failure.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff interval in milliseconds; doubles on each retry.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Enable the read-through thought cache.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            brain_id: None,
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            cache_enabled: default_true(),
        }
    }
}

fn default_base_url() -> Option<String> {
    Some(DEFAULT_BASE_URL.to_string())
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_retry_attempts() -> u32 {
    3
}

const fn default_retry_interval_ms() -> u64 {
    500
}

const fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Default: "warn"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
