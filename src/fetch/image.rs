//! Image downloads with dimension probing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::config::{IMAGE_FETCH_TIMEOUT_SECS, MAX_IMAGE_SIZE, UNKNOWN_IMAGE_EXTENSION};
use crate::error_handling::ImageError;

/// A downloaded image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    /// Final path, including the extension derived from `Content-Type`
    pub path: PathBuf,
    /// Pixels, as reported by the image header
    pub width: usize,
    pub height: usize,
}

/// Maps a `Content-Type` value to a file extension.
///
/// Uses the media subtype (`image/webp` becomes `.webp`) and ignores
/// parameters. Falls back to `.unknown` when the header is missing or
/// malformed.
pub fn extension_from_content_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .and_then(|mime| mime.rsplit_once('/'))
        .map(|(_, subtype)| subtype.trim())
        .filter(|subtype| !subtype.is_empty())
        .map(|subtype| format!(".{}", subtype.to_ascii_lowercase()))
        .unwrap_or_else(|| UNKNOWN_IMAGE_EXTENSION.to_string())
}

/// Downloads an image to `path_stem` + extension and reads its dimensions.
///
/// The extension comes from the response's `Content-Type`. The body is
/// streamed with a `MAX_IMAGE_SIZE` cap and the whole request is bounded by
/// `IMAGE_FETCH_TIMEOUT_SECS`.
///
/// # Errors
///
/// - `ImageError::Timeout` / `ImageError::Request` for transport failures
/// - `ImageError::Status` for non-2xx responses (nothing is written)
/// - `ImageError::TooLarge` when the body exceeds the cap (nothing is written)
/// - `ImageError::Io` if the file cannot be written
/// - `ImageError::Dimensions` if the bytes are not a recognised image; the
///   file has already been written at that point
pub async fn download_image(
    client: &reqwest::Client,
    image_url: &str,
    path_stem: impl AsRef<Path>,
) -> Result<ImageInfo, ImageError> {
    let timeout = Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS);
    let (content_type, bytes) = match tokio::time::timeout(timeout, fetch_image_bytes(client, image_url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ImageError::Timeout {
                url: image_url.to_string(),
            })
        }
    };

    let mut path: OsString = path_stem.as_ref().as_os_str().to_owned();
    path.push(extension_from_content_type(content_type.as_deref()));
    let path = PathBuf::from(path);

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ImageError::Io {
            path: path.clone(),
            source,
        })?;

    let size = imagesize::blob_size(&bytes).map_err(|e| ImageError::Dimensions {
        path: path.clone(),
        message: e.to_string(),
    })?;
    info!(
        "Image dimensions: {}x{} ({})",
        size.width,
        size.height,
        path.display()
    );

    Ok(ImageInfo {
        path,
        width: size.width,
        height: size.height,
    })
}

/// Fetches the body and `Content-Type` of an image URL, enforcing the size cap.
async fn fetch_image_bytes(
    client: &reqwest::Client,
    image_url: &str,
) -> Result<(Option<String>, Vec<u8>), ImageError> {
    let response = client.get(image_url).send().await?;
    let status = response.status();
    info!("download_image() status code: {} for {}", status.as_u16(), image_url);

    if !status.is_success() {
        return Err(ImageError::Status {
            url: image_url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut stream = response.bytes_stream();
    let mut buf = Vec::with_capacity(MAX_IMAGE_SIZE.min(64 * 1024));
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > MAX_IMAGE_SIZE {
            debug!(
                "Image exceeds {}MB limit for {} (aborting at {} bytes)",
                MAX_IMAGE_SIZE / (1024 * 1024),
                image_url,
                buf.len() + chunk.len()
            );
            return Err(ImageError::TooLarge {
                url: image_url.to_string(),
                limit: MAX_IMAGE_SIZE,
            });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok((content_type, buf))
}
