//! Configuration types.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing and for configuring the library programmatically.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_FLUSH_PATH, DEFAULT_USER_AGENT,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// What the shutdown drain does after a save action fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DrainPolicy {
    /// Stop at the first failure; later descriptors are not invoked.
    #[default]
    FailFast,
    /// Invoke every descriptor and report all failures.
    BestEffort,
}

/// Settings for the shutdown coordinator.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Deadline for each save action during the drain
    pub action_timeout: Duration,

    /// Where the emergency flush writes leftover pending items
    pub flush_path: PathBuf,

    /// Behavior after a failed save action
    pub drain_policy: DrainPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(DEFAULT_ACTION_TIMEOUT_SECS),
            flush_path: PathBuf::from(DEFAULT_FLUSH_PATH),
            drain_policy: DrainPolicy::FailFast,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use scrape_utils::Config;
/// use std::time::Duration;
///
/// let mut config = Config::default();
/// config.lifecycle.action_timeout = Duration::from_secs(5);
/// config.validate().expect("valid config");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Shutdown coordinator settings
    pub lifecycle: LifecycleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl Config {
    /// Checks the configuration for values the coordinator cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lifecycle.action_timeout.is_zero() {
            return Err(ConfigError::ZeroActionTimeout);
        }
        if self.lifecycle.flush_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFlushPath);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}
