//! Network fetches.
//!
//! Currently image downloads only: the body is streamed with a size cap,
//! written next to a caller-chosen stem, and probed for its dimensions.

mod image;

pub use image::{download_image, extension_from_content_type, ImageInfo};
