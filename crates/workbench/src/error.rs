//! Workbench error types.

use thiserror::Error;

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single upstream GET failed.
///
/// Both kinds end up as error data on the tool boundary; only the message
/// text tells them apart there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection failure, timeout or non-2xx status.
    #[error("API request failed: {0}")]
    Request(String),

    /// The body was not valid JSON.
    #[error("Failed to parse API response as JSON")]
    Decode,
}
