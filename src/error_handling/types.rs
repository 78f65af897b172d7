//! Error type definitions.
//!
//! This module defines the error types returned by the coordinator, the
//! emergency flush, and the utility collaborators.

use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Invalid library configuration, reported by `Config::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("action timeout must be greater than zero")]
    ZeroActionTimeout,

    #[error("flush path must not be empty")]
    EmptyFlushPath,

    #[error("user agent must not be empty")]
    EmptyUserAgent,
}

/// Errors raised by the shutdown coordinator.
///
/// Installation errors are fatal at startup. Action errors are collected into
/// the drain report and decide the exit code; they never escape the drain.
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// Registering an OS signal listener failed.
    #[error("failed to install {signal} handler: {source}")]
    SignalInstall {
        signal: &'static str,
        source: std::io::Error,
    },

    /// Signal handlers were already installed for this lifecycle.
    #[error("signal handlers are already installed")]
    AlreadyInstalled,

    /// A descriptor was added after a shutdown trigger was accepted.
    #[error("shutdown already started, descriptor '{0}' was not registered")]
    RegistryClosed(String),

    /// A save action returned an error.
    #[error("save action '{name}' failed: {source:#}")]
    ActionFailed {
        name: String,
        source: anyhow::Error,
    },

    /// A save action panicked while being invoked or polled.
    #[error("save action '{name}' panicked: {message}")]
    ActionPanicked { name: String, message: String },

    /// A save action did not complete within its deadline.
    #[error("save action '{name}' timed out after {timeout:?}")]
    ActionTimedOut { name: String, timeout: Duration },
}

impl ShutdownError {
    /// Name of the save action this error refers to, if any.
    pub fn action_name(&self) -> Option<&str> {
        match self {
            ShutdownError::ActionFailed { name, .. }
            | ShutdownError::ActionPanicked { name, .. }
            | ShutdownError::ActionTimedOut { name, .. } => Some(name),
            ShutdownError::RegistryClosed(name) => Some(name),
            ShutdownError::SignalInstall { .. } | ShutdownError::AlreadyInstalled => None,
        }
    }
}

/// Errors from the emergency flush. Logged by the coordinator, never escalated.
#[derive(Error, Debug)]
pub enum FlushError {
    /// The pending items could not be converted to JSON.
    #[error("failed to serialize pending items: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The flush file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from downloading an image.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The request itself failed (connect, TLS, body read).
    #[error("image request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The server answered with a non-success status.
    #[error("image request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The download did not finish in time.
    #[error("image request to {url} timed out")]
    Timeout { url: String },

    /// The body exceeded the size cap.
    #[error("image at {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    /// The image could not be written to disk.
    #[error("failed to write image to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The bytes are not an image format we can read dimensions from.
    #[error("could not read image dimensions from {}: {message}", path.display())]
    Dimensions { path: PathBuf, message: String },
}

/// Errors from rendering a value as YAML.
#[derive(Error, Debug)]
pub enum YamlError {
    /// The value could not be serialized.
    #[error("YAML serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
