//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/epistats/config.toml` and is
//! immutable for the lifetime of the process; the engine receives it at
//! construction.
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/epistats/` (~/.config/epistats/)
//! - Data: `$XDG_DATA_HOME/epistats/` (~/.local/share/epistats/)
//! - State/Logs: `$XDG_STATE_HOME/epistats/` (~/.local/state/epistats/)

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Splunk search API configuration (optional; absent means the real
    /// statistics source cannot be constructed, e.g. mock-only development)
    #[serde(default)]
    pub splunk: Option<SplunkConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Splunk search API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SplunkConfig {
    /// Search endpoint URL
    pub url: String,

    /// Basic-auth username
    pub username: String,

    /// Basic-auth password
    pub password: String,

    /// Fixed query returning the active app count per day
    pub active_apps_query: String,

    /// Fixed query returning used authorization codes per day
    pub used_auth_code_count_query: String,

    /// Fixed query returning positive test counts per day
    pub positive_test_count_query: String,

    /// Fixed query returning code-entry delay buckets per day
    pub covid_codes_entered_query: String,

    /// First day of the statistics history (inclusive)
    #[serde(default = "default_query_start_date")]
    pub start_date: NaiveDate,

    /// Days to cut off at the recent end of full-history queries
    #[serde(default)]
    pub end_days_back: i64,

    /// Static override for the active app count. When set it replaces the
    /// fetched value unconditionally.
    pub active_apps_override: Option<i64>,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Full request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl SplunkConfig {
    /// Validate configuration, returning an error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::Config("splunk.url must not be empty".to_string()));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::Config(
                "splunk.username and splunk.password are required".to_string(),
            ));
        }
        for (name, query) in [
            ("active_apps_query", &self.active_apps_query),
            ("used_auth_code_count_query", &self.used_auth_code_count_query),
            ("positive_test_count_query", &self.positive_test_count_query),
            ("covid_codes_entered_query", &self.covid_codes_entered_query),
        ] {
            if query.is_empty() {
                return Err(Error::Config(format!("splunk.{} must not be empty", name)));
            }
        }
        if self.end_days_back < 0 {
            return Err(Error::Config(
                "splunk.end_days_back must not be negative".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "splunk timeouts must be bounded and non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_query_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the Splunk configuration or an error when it is absent
    pub fn splunk(&self) -> Result<&SplunkConfig> {
        self.splunk
            .as_ref()
            .ok_or_else(|| Error::Config("missing [splunk] configuration section".to_string()))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/epistats/config.toml` (~/.config/epistats/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("epistats").join("config.toml")
    }

    /// Returns the data directory path (for the history store)
    ///
    /// `$XDG_DATA_HOME/epistats/` (~/.local/share/epistats/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("epistats")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/epistats/` (~/.local/state/epistats/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("epistats")
    }

    /// Returns the history store file path
    ///
    /// `$XDG_DATA_HOME/epistats/history.db` (~/.local/share/epistats/history.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("history.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/epistats/epistats.log` (~/.local/state/epistats/epistats.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("epistats.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
