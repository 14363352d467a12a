//! Exporter-specific error types.

use phpipam_client::PhpIpamError;
use thiserror::Error;

/// Errors that can occur in the phpIPAM exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// phpIPAM API error (fatal only at startup, when logging in)
    #[error("phpIPAM error: {0}")]
    PhpIpam(#[from] PhpIpamError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Listener or socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),
}
