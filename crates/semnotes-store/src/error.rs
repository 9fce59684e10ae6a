//! Media host error types.

use thiserror::Error;

/// Errors that can occur when talking to the media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The API rejected the credentials or signature.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The asset does not exist on the host.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// No media host is configured.
    #[error("media host not configured")]
    NotConfigured,
}
