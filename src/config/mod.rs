//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, geo parameters)
//! - Logging and shutdown configuration types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, DrainPolicy, LifecycleConfig, LogFormat, LogLevel};
