//! Wire protocol for the camera frame feed.
//!
//! Every message travels in a frame with:
//! - A 2-byte magic number ("VG") for stream synchronization
//! - A 4-byte little-endian payload length
//! - A JSON payload `{"event": ..., "data": ...}`
//!
//! Three events are understood: `get_frame` (client pulls the next frame),
//! `frame` (server delivers one base64 JPEG) and `error` (server could not
//! produce a frame). Anything else decodes to [`FeedMessage::Other`].

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{
    decode_frame, decode_message, encode_frame, encode_message, FeedCodec, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, MAGIC,
};
pub use error::{Result, WireError};
pub use message::{
    Envelope, FeedMessage, FramePayload, ServerError, EVENT_ERROR, EVENT_FRAME, EVENT_GET_FRAME,
};
