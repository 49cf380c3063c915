/// Errors that can occur while encoding or decoding feed messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x5647 \"VG\")")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred on the underlying stream.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame payload is not a JSON envelope.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame carried an empty image.
    #[error("frame image is empty")]
    EmptyImage,

    /// A frame image is not valid base64.
    #[error("invalid frame image: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    /// The stream ended in the middle of a frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, WireError>;
