//! Configuration constants.
//!
//! This module defines the constants used throughout the crate: shutdown
//! defaults, geo math parameters, and limits for image downloads.

// Shutdown coordination
/// File the emergency flush writes leftover pending items to.
///
/// Relative to the process working directory. Kept under its historical name so
/// existing recovery tooling keeps finding it.
pub const DEFAULT_FLUSH_PATH: &str = "unsavedPlaces.json";
/// Per-action deadline during the shutdown drain, in seconds.
/// An action that runs longer is reported as a failure.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;
/// Exit code used when every save action completed (or none were registered).
pub const EXIT_CODE_SUCCESS: i32 = 0;
/// Exit code used when a save action failed, panicked or timed out.
pub const EXIT_CODE_FAILURE: i32 = 1;

// Geo math
/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
/// Distance multiplier between a search circle's center and its six neighbours.
/// Approximates sqrt(3) for hexagonal packing of equal circles.
pub const HEX_RING_SPACING: f64 = 1.732;
/// Number of points in a hexagonal ring.
pub const HEX_RING_POINTS: usize = 6;

// Text helpers
pub const DEFAULT_RANDOM_STRING_LENGTH: usize = 256;
pub const RANDOM_STRING_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";
pub const DEFAULT_YAML_INDENT: usize = 2;

// Image downloads
/// Image fetch timeout in seconds
pub const IMAGE_FETCH_TIMEOUT_SECS: u64 = 20;
/// Maximum image size in bytes (20MB)
/// Larger bodies are aborted mid-stream to prevent memory exhaustion
pub const MAX_IMAGE_SIZE: usize = 20 * 1024 * 1024;
/// Extension used when the response carries no usable `Content-Type`.
pub const UNKNOWN_IMAGE_EXTENSION: &str = ".unknown";

/// Default User-Agent string for HTTP requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
