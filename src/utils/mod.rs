//! Utility helpers for the scraping pipeline.
//!
//! This module provides:
//! - Slugs and small string helpers
//! - Timestamps and month labels
//! - Hexagonal search-ring geo math
//! - YAML rendering with a global indent
//! - ID extraction from Maps resource names
//! - Record de-duplication and comparison
//! - Output directory helpers

mod collections;
mod fs;
mod geo;
mod ids;
mod slug;
mod text;
mod timestamp;
mod yaml;

pub use collections::{dedupe_by_key, equal_excluding};
pub use fs::{clean_paths, find_file_name_by_prefix};
pub use geo::{calc_surrounding_coords, destination_point, Coordinate};
pub use ids::{extract_id, IdKind};
pub use slug::{deslugify, slugify};
pub use text::{camel_to_snake_case, generate_random_string, truncate};
pub use timestamp::{
    current_month_year, format_timestamp, local_timestamp, month_year, utc_timestamp,
};
pub use yaml::to_indented_yaml;
