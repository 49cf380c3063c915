use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// Client → server: pull the next frame.
pub const EVENT_GET_FRAME: &str = "get_frame";
/// Server → client: one encoded frame.
pub const EVENT_FRAME: &str = "frame";
/// Server → client: frame production failed.
pub const EVENT_ERROR: &str = "error";

/// JSON envelope carried in every wire frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Image payload of a `frame` event.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FramePayload {
    /// Base64-encoded JPEG.
    pub image: String,
}

impl FramePayload {
    /// Encode raw JPEG bytes.
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        Self {
            image: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Decode the image bytes. A `data:image/...;base64,` prefix is tolerated.
    pub fn decode_image(&self) -> Result<Bytes> {
        let encoded = match self.image.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.image.as_str(),
        };
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(WireError::EmptyImage);
        }
        let bytes = general_purpose::STANDARD.decode(encoded)?;
        Ok(Bytes::from(bytes))
    }
}

impl std::fmt::Debug for FramePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePayload")
            .field("image", &format_args!("<base64:{} chars>", self.image.len()))
            .finish()
    }
}

/// Payload of an `error` event. Its shape is server-defined.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerError {
    pub detail: serde_json::Value,
}

impl ServerError {
    pub fn new(detail: impl Into<serde_json::Value>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Best-effort human-readable message.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "unspecified error".to_string(),
            other => ["message", "error"]
                .iter()
                .find_map(|key| other.get(key).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        }
    }
}

/// A decoded feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// `get_frame` with an empty payload.
    RequestFrame,
    /// `frame` carrying one image.
    Frame(FramePayload),
    /// `frame` whose data is not `{"image": string}`. Decoding it is not a
    /// protocol error; the client drops it and keeps pulling.
    InvalidFrame {
        data: serde_json::Value,
        reason: String,
    },
    /// `error` reported by the server.
    Error(ServerError),
    /// Any event this client does not handle.
    Other {
        event: String,
        data: serde_json::Value,
    },
}

impl FeedMessage {
    pub fn event(&self) -> &str {
        match self {
            FeedMessage::RequestFrame => EVENT_GET_FRAME,
            FeedMessage::Frame(_) | FeedMessage::InvalidFrame { .. } => EVENT_FRAME,
            FeedMessage::Error(_) => EVENT_ERROR,
            FeedMessage::Other { event, .. } => event.as_str(),
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope> {
        let data = match self {
            FeedMessage::RequestFrame => serde_json::json!({}),
            FeedMessage::Frame(payload) => serde_json::to_value(payload)?,
            FeedMessage::InvalidFrame { data, .. } => data.clone(),
            FeedMessage::Error(err) => err.detail.clone(),
            FeedMessage::Other { data, .. } => data.clone(),
        };
        Ok(Envelope {
            event: self.event().to_string(),
            data,
        })
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        match envelope.event.as_str() {
            EVENT_GET_FRAME => Ok(FeedMessage::RequestFrame),
            EVENT_FRAME => match FramePayload::deserialize(&envelope.data) {
                Ok(payload) => Ok(FeedMessage::Frame(payload)),
                Err(err) => Ok(FeedMessage::InvalidFrame {
                    data: envelope.data,
                    reason: err.to_string(),
                }),
            },
            EVENT_ERROR => Ok(FeedMessage::Error(ServerError::new(envelope.data))),
            _ => Ok(FeedMessage::Other {
                event: envelope.event,
                data: envelope.data,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_frame_carries_empty_object() {
        let envelope = FeedMessage::RequestFrame.to_envelope().unwrap();
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"event":"get_frame","data":{}}"#
        );
    }

    #[test]
    fn frame_envelope_decodes_image() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"event":"frame","data":{"image":"/9j/4A=="}}"#).unwrap();
        let message = FeedMessage::from_envelope(envelope).unwrap();
        let FeedMessage::Frame(payload) = message else {
            panic!("expected frame message");
        };
        assert_eq!(
            payload.decode_image().unwrap(),
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0])
        );
    }

    #[test]
    fn frame_without_image_is_kept_as_invalid_frame() {
        for raw in [
            r#"{"event":"frame","data":{}}"#,
            r#"{"event":"frame"}"#,
            r#"{"event":"frame","data":{"image":42}}"#,
        ] {
            let envelope: Envelope = serde_json::from_str(raw).unwrap();
            let message = FeedMessage::from_envelope(envelope).unwrap();
            assert!(
                matches!(message, FeedMessage::InvalidFrame { .. }),
                "{raw} decoded to {message:?}"
            );
            assert_eq!(message.event(), EVENT_FRAME);
        }
    }

    #[test]
    fn empty_image_is_rejected() {
        let payload = FramePayload {
            image: "data:image/jpeg;base64,".to_string(),
        };
        assert!(matches!(payload.decode_image(), Err(WireError::EmptyImage)));
    }

    #[test]
    fn error_event_accepts_any_shape() {
        let envelope: Envelope = serde_json::from_str(r#"{"event":"error"}"#).unwrap();
        let message = FeedMessage::from_envelope(envelope).unwrap();
        assert_eq!(message, FeedMessage::Error(ServerError::default()));

        let err = ServerError::new(serde_json::json!({"message": "camera offline"}));
        assert_eq!(err.message(), "camera offline");
        assert_eq!(ServerError::new("boom").message(), "boom");
    }

    #[test]
    fn unknown_events_are_preserved() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"event":"camera_list","data":[1,2]}"#).unwrap();
        let message = FeedMessage::from_envelope(envelope).unwrap();
        assert_eq!(message.event(), "camera_list");
        assert!(matches!(message, FeedMessage::Other { .. }));
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let payload = FramePayload {
            image: "data:image/jpeg;base64,/9j/4A==".to_string(),
        };
        assert_eq!(payload.decode_image().unwrap().len(), 4);
    }

    #[test]
    fn invalid_base64_is_reported() {
        let payload = FramePayload {
            image: "not base64!!".to_string(),
        };
        assert!(matches!(
            payload.decode_image(),
            Err(WireError::InvalidImage(_))
        ));
    }

    #[test]
    fn debug_output_hides_image_data() {
        let payload = FramePayload::from_jpeg(&[1, 2, 3]);
        let dbg = format!("{payload:?}");
        assert!(dbg.contains("<base64:4 chars>"));
        assert!(!dbg.contains(&payload.image));
    }
}
