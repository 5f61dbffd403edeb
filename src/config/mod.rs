//! Configuration management for the btodo application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. It supports configuring the location of the
//! encrypted data file and how often the reminder watcher polls.
//!
//! # Environment Variables
//!
//! - `BTODO_DATA_FILE`: Path to the encrypted store (defaults to
//!   ~/.local/share/btodo/btodo_data.enc)
//! - `BTODO_POLL_INTERVAL`: Seconds between reminder polls (defaults to 30)
//! - `HOME`: Used for expanding the default data file path

use crate::constants::{
    DEFAULT_DATA_SUBPATH, DEFAULT_POLL_INTERVAL_SECS, ENV_VAR_DATA_FILE, ENV_VAR_HOME,
    ENV_VAR_POLL_INTERVAL, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the btodo application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use btodo::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_file: PathBuf::from("/path/to/btodo_data.enc"),
///     poll_interval_secs: 60,
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use btodo::Config;
/// use std::env;
///
/// env::set_var("BTODO_DATA_FILE", "/custom/btodo_data.enc");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.data_file.to_str(), Some("/custom/btodo_data.enc"));
/// ```
pub struct Config {
    /// Encrypted store file.
    ///
    /// Loaded from `BTODO_DATA_FILE` with a fallback under `$HOME`.
    pub data_file: PathBuf,

    /// Seconds between reminder polls in `watch` mode.
    pub poll_interval_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_file", &REDACTED_PLACEHOLDER)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from(""),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data file path is expanded with `shellexpand`, so `~` and `$VAR`
    /// references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The data file path expansion fails or yields an empty path
    /// - `BTODO_POLL_INTERVAL` is not a positive integer
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use btodo::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Polling every {} seconds", config.poll_interval_secs),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let data_file_str = env::var(ENV_VAR_DATA_FILE).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBPATH)
        });

        let expanded_path = shellexpand::full(&data_file_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let data_file = PathBuf::from(expanded_path.into_owned());

        if data_file.as_os_str().is_empty() {
            return Err(AppError::Config("Data file path is empty".to_string()));
        }

        let poll_interval_secs = match env::var(ENV_VAR_POLL_INTERVAL) {
            Ok(raw) => parse_interval(&raw)?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Config {
            data_file,
            poll_interval_secs,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data file path is empty"
    /// - "Data file must be an absolute path"
    /// - "Poll interval must be at least one second"
    pub fn validate(&self) -> AppResult<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(AppError::Config("Data file path is empty".to_string()));
        }

        if !self.data_file.is_absolute() {
            return Err(AppError::Config(
                "Data file must be an absolute path".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "Poll interval must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

fn parse_interval(raw: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::Config(format!(
            "{} must be a positive number of seconds, got '{}'",
            ENV_VAR_POLL_INTERVAL, raw
        ))),
    }
}
