//! Error handling.
//!
//! This module provides the error types for:
//! - Configuration validation
//! - Initialization (logger, HTTP client)
//! - Shutdown coordination (signal installation, save action failures)
//! - Emergency flush
//! - Image downloads and YAML rendering

mod types;

// Re-export public API
pub use types::{ConfigError, FlushError, ImageError, InitializationError, ShutdownError, YamlError};
