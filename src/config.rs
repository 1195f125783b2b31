//! Tracker configuration.
//!
//! [`TrackerConfig`] is built once at startup from, lowest precedence
//! first: built-in defaults, an optional `eats-tracker.toml`, and the
//! process environment (which `main` seeds from `.env`). It is then passed
//! by reference to every component and never mutated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::state_machine::RetryConfig;

/// Default location of the optional config file.
pub const DEFAULT_CONFIG_PATH: &str = "eats-tracker.toml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "EATS_TRACKER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Home Assistant REST root, including `/api`.
    #[serde(default)]
    pub api_server_url: String,

    /// Home Assistant long-lived access token.
    #[serde(default)]
    pub access_token: String,

    /// Sensor that receives the order status label.
    #[serde(default)]
    pub sensor_entity_id: String,

    /// `input_text` entity holding the tracked share link.
    #[serde(default)]
    pub url_entity_id: String,

    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    #[serde(default = "default_timeout_seconds")]
    pub uber_eats_api_timeout_seconds: u64,

    #[serde(default = "default_timeout_seconds")]
    pub home_assistant_timeout_seconds: u64,

    /// Failed cycles tolerated in a row before the poller gives up.
    /// Zero means the first failure stops the process.
    #[serde(default)]
    pub max_consecutive_failures: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_poll_interval_seconds() -> u64 {
    60
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_server_url: String::new(),
            access_token: String::new(),
            sensor_entity_id: String::new(),
            url_entity_id: String::new(),
            poll_interval_seconds: default_poll_interval_seconds(),
            uber_eats_api_timeout_seconds: default_timeout_seconds(),
            home_assistant_timeout_seconds: default_timeout_seconds(),
            max_consecutive_failures: 0,
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl TrackerConfig {
    /// Load from the config file (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path), |key| std::env::var(key).ok())
    }

    /// Load from `path` and an arbitrary environment lookup.
    /// A missing file is not an error; defaults are used instead.
    pub fn load_from(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str::<TrackerConfig>(&contents)?
        } else {
            Self::default()
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        for (key, field) in [
            ("API_SERVER_URL", &mut self.api_server_url),
            ("ACCESS_TOKEN", &mut self.access_token),
            ("SENSOR_ENTITY_ID", &mut self.sensor_entity_id),
            ("URL_ENTITY_ID", &mut self.url_entity_id),
        ] {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        for (key, field) in [
            ("POLL_INTERVAL_SECONDS", &mut self.poll_interval_seconds),
            ("UBER_EATS_API_TIMEOUT_SECONDS", &mut self.uber_eats_api_timeout_seconds),
            ("HOME_ASSISTANT_TIMEOUT_SECONDS", &mut self.home_assistant_timeout_seconds),
            ("RETRY_BASE_DELAY_MS", &mut self.retry_base_delay_ms),
        ] {
            if let Some(value) = lookup(key) {
                *field = parse_number(key, &value)?;
            }
        }

        if let Some(value) = lookup("MAX_CONSECUTIVE_FAILURES") {
            self.max_consecutive_failures = parse_number("MAX_CONSECUTIVE_FAILURES", &value)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("API_SERVER_URL", &self.api_server_url),
            ("ACCESS_TOKEN", &self.access_token),
            ("SENSOR_ENTITY_ID", &self.sensor_entity_id),
            ("URL_ENTITY_ID", &self.url_entity_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }
        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "POLL_INTERVAL_SECONDS",
                value: "0".into(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn uber_eats_timeout(&self) -> Duration {
        Duration::from_secs(self.uber_eats_api_timeout_seconds)
    }

    pub fn home_assistant_timeout(&self) -> Duration {
        Duration::from_secs(self.home_assistant_timeout_seconds)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_consecutive_failures,
            base_delay_ms: self.retry_base_delay_ms,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}
