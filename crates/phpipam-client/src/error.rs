//! phpIPAM client errors

use thiserror::Error;

/// Errors that can occur when interacting with the phpIPAM API
#[derive(Debug, Error)]
pub enum PhpIpamError {
    /// Transport error (connection refused, TLS failure, truncated body, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// phpIPAM answered with a non-success status
    #[error("phpIPAM API error: {0}")]
    Api(String),

    /// Response body could not be decoded into the expected structure
    #[error("Decode error: {0}")]
    Decode(String),

    /// Login failed or returned no usable token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., empty base address or credentials)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
