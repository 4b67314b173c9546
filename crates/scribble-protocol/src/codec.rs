//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The gateway only needs *something* that turns intents and events into
//! frames and back; [`Codec`] is that seam. [`JsonCodec`] is the one the
//! server ships with, since every client speaks JSON.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frame bytes and decodes frame bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use scribble_protocol::{ClientIntent, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let intent: ClientIntent = codec
///     .decode(br#"{"type":"start","roomId":"r1"}"#)
///     .unwrap();
/// assert_eq!(intent, ClientIntent::Start { room_id: RoomId::from("r1") });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientIntent, ServerEvent};

    #[test]
    fn test_encode_produces_utf8_json() {
        let bytes = JsonCodec.encode(&ServerEvent::CanvasCleared).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"type":"canvasCleared"}"#
        );
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientIntent, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
