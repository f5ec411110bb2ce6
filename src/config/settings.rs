use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::store::RetryPolicy;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "ADMIN_RECORDS_BASE_URL";
/// Environment variable overriding `customer_id`
pub const ENV_CUSTOMER_ID: &str = "ADMIN_RECORDS_CUSTOMER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without a trailing slash
    pub base_url: String,
    /// Tenant identifier sent with every mutation
    pub customer_id: i64,
    /// Per-request transport timeout
    pub request_timeout: Duration,
    /// Read retry configuration
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlRetryConfig {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub base_url: Option<String>,
    pub customer_id: Option<i64>,
    pub request_timeout_secs: Option<u64>,
    pub retry: Option<TomlRetryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            customer_id: 1,
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig {
                max_retries: 3,
                base_delay_ms: 1000,
                max_delay_ms: 30_000,
            },
        }
    }
}

/// Per-user data directory holding `config.toml` and `logs/`
/// (`~/.admin-records`, or `./.admin-records` without a home directory)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".admin-records")
}

impl Config {
    /// Load configuration from `explicit` or `<data_dir>/config.toml`, then
    /// apply environment overrides.
    ///
    /// A missing default config file yields defaults; a missing explicit one
    /// is an error.
    pub fn load(data_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (data_dir.join(CONFIG_FILE), false),
        };

        if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let toml_config =
                toml::from_str::<TomlConfig>(&contents).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            config.merge(toml_config);
            tracing::debug!(path = %path.display(), "Loaded config file");
        } else if required {
            return Err(ConfigError::NotFound(path));
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge values present in the TOML file on top of the current values
    pub fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(base_url) = toml_config.base_url {
            self.set_base_url(&base_url);
        }
        if let Some(customer_id) = toml_config.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(secs) = toml_config.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retry) = toml_config.retry {
            if let Some(max_retries) = retry.max_retries {
                self.retry.max_retries = max_retries;
            }
            if let Some(base_delay_ms) = retry.base_delay_ms {
                self.retry.base_delay_ms = base_delay_ms;
            }
            if let Some(max_delay_ms) = retry.max_delay_ms {
                self.retry.max_delay_ms = max_delay_ms;
            }
        }
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.set_base_url(&base_url);
        }
        if let Some(raw) = lookup(ENV_CUSTOMER_ID) {
            self.customer_id = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_CUSTOMER_ID,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
        }
    }
}
