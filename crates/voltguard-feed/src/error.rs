use std::time::Duration;

use voltguard_wire::WireError;

/// Errors that can occur in the feed client.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Wire-level error (framing, JSON, image decoding).
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Failed to connect to the feed endpoint.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    /// Connecting took longer than the configured timeout.
    #[error("connecting to {endpoint} timed out after {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },

    /// An I/O error occurred on an established connection.
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The driver task panicked or was aborted.
    #[error("feed task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
