//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, IMAGE_FETCH_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for image downloads.
///
/// Creates a `reqwest::Client` configured with the User-Agent from `config`
/// and a request timeout of `IMAGE_FETCH_TIMEOUT_SECS`. Redirects are followed
/// with reqwest's default policy.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(IMAGE_FETCH_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
