use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Result, WireError};
use crate::message::{Envelope, FeedMessage};

/// Frame header: magic (2) + length (4) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Magic bytes: "VG" (0x56 0x47).
pub const MAGIC: [u8; 2] = [0x56, 0x47];

/// Default maximum payload size: 8 MiB. Large enough for a base64 1080p JPEG.
pub const DEFAULT_MAX_PAYLOAD: usize = 8 * 1024 * 1024;

/// Encode a raw payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬──────────────────────┐
/// │ Magic (2B)   │ Length    │ Payload              │
/// │ 0x56 0x47    │ (4B LE)   │ (Length bytes, JSON) │
/// │ "VG"         │           │                      │
/// └──────────────┴───────────┴──────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(WireError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode one raw payload from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(WireError::InvalidMagic);
    }

    let payload_len = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;
    if payload_len > max_payload {
        return Err(WireError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Serialize a message into a complete frame.
pub fn encode_message(message: &FeedMessage, dst: &mut BytesMut) -> Result<()> {
    let payload = serde_json::to_vec(&message.to_envelope()?)?;
    encode_frame(&payload, dst)
}

/// Decode one message from a buffer. See [`decode_frame`].
pub fn decode_message(src: &mut BytesMut, max_payload: usize) -> Result<Option<FeedMessage>> {
    let Some(payload) = decode_frame(src, max_payload)? else {
        return Ok(None);
    };
    let envelope: Envelope = serde_json::from_slice(&payload)?;
    FeedMessage::from_envelope(envelope).map(Some)
}

/// `tokio_util` codec for [`FeedMessage`] streams.
#[derive(Debug, Clone)]
pub struct FeedCodec {
    max_payload_size: usize,
}

impl FeedCodec {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for FeedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FeedCodec {
    type Item = FeedMessage;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<FeedMessage>> {
        decode_message(src, self.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<FeedMessage>> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => Err(WireError::ConnectionClosed),
        }
    }
}

impl Encoder<FeedMessage> for FeedCodec {
    type Error = WireError;

    fn encode(&mut self, message: FeedMessage, dst: &mut BytesMut) -> Result<()> {
        let payload = serde_json::to_vec(&message.to_envelope()?)?;
        if payload.len() > self.max_payload_size {
            return Err(WireError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_size,
            });
        }
        encode_frame(&payload, dst)
    }
}
