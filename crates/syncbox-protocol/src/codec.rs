//! Codec trait and the JSON implementation.
//!
//! A codec turns envelopes into the text that goes inside a frame and back.
//! The framing layer only needs something that implements [`Codec`], so a
//! different text encoding can be swapped in without touching it.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// Output must never contain [`BYTE_DELIM`](crate::BYTE_DELIM); the frame
/// layer relies on that byte to find the end of an envelope and rejects
/// encodings that contain it.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the encoding every Syncbox peer speaks. JSON escapes control
/// characters inside strings and byte fields are base64, so the output
/// never contains the delimiter byte.
///
/// ## Example
///
/// ```rust
/// use syncbox_protocol::{Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let request = Request::new("alice", "IDENTITY", Vec::new());
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: Request = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BYTE_DELIM, Response};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let response = Response::accept(vec![BYTE_DELIM; 16]);

        let bytes = codec.encode(&response).unwrap();
        assert!(!bytes.contains(&BYTE_DELIM));

        let decoded: Response = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_json_codec_decode_error() {
        let result: Result<Response, _> = JsonCodec.decode(b"{");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
