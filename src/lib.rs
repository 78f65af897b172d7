//! scrape_utils library: shutdown coordination and helpers for scraping pipelines
//!
//! The centerpiece is [`Lifecycle`], a coordinator that runs registered save
//! actions once, in order, when the process receives SIGINT or SIGTERM, and
//! writes leftover pending items to disk when the work finishes on its own.
//! Around it sit the small utilities a scraper keeps reaching for: slugs,
//! image downloads, YAML rendering, hexagonal search rings, timestamps and
//! ID extraction.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use scrape_utils::{register_shutdown, LifecycleConfig, SaveDescriptor};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let unsaved = Arc::new(Mutex::new(vec!["place-1".to_string()]));
//! let places = SaveDescriptor::new("places", unsaved.clone(), |items| async move {
//!     let items = items.lock().map(|v| v.clone()).unwrap_or_default();
//!     println!("saving {} places", items.len());
//!     Ok(())
//! })
//! .with_pending_items(unsaved);
//!
//! let lifecycle = register_shutdown(vec![places], LifecycleConfig::default())?;
//!
//! // ... scrape ...
//!
//! lifecycle.finish().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The coordinator requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call it from within an async context.

pub mod config;
mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod lifecycle;
pub mod utils;

// Re-export public API
pub use config::{Config, DrainPolicy, LifecycleConfig, LogFormat, LogLevel};
pub use error_handling::{ConfigError, FlushError, ImageError, InitializationError, ShutdownError, YamlError};
pub use fetch::{download_image, ImageInfo};
pub use lifecycle::{
    register_shutdown, DrainReport, Lifecycle, LifecycleState, PendingItems, ProcessExit,
    SaveDescriptor, Trigger,
};
