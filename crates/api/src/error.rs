//! Error type for data-provider calls.

use thiserror::Error;

/// Failure while talking to an external data provider.
///
/// These are transient by design: polling stores catch them, log, and keep
/// serving the previous snapshot.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, non-2xx status).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but reported an application-level error.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response arrived but could not be decoded into the API model.
    #[error("malformed response: {0}")]
    Decode(String),
}
