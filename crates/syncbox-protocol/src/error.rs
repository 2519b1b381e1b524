//! Error types for the protocol layer.
//!
//! Nothing in this crate retries or logs. Every failure is handed back to
//! the caller, which decides whether to drop the connection or answer with
//! a bad-status [`Response`](crate::Response).

use crate::constants::Role;

/// Errors that can occur while framing, chunking, or encoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A packet count or sequence index does not fit the 4-byte address
    /// field. The value is never truncated.
    #[error("address overflow: {0} does not fit in a 4-byte field")]
    AddressOverflow(u64),

    /// A packet record could not be read back, usually because the buffer
    /// has the wrong length.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// The text of a `Request` or `Response` does not have the expected
    /// field structure.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Raised by codecs and by typed payload decoding.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// An empty payload was handed to the serializer. A zero-packet message
    /// cannot be observed on the stream, so it is refused up front.
    #[error("cannot serialize an empty payload")]
    EmptyPayload,

    /// Packets handed to validation are not a complete, ordered message.
    #[error("packet {index} out of sequence: size {size}, sequence {sequence}, expected {expected} packets")]
    OutOfSequence {
        index: usize,
        size: u32,
        sequence: u32,
        expected: usize,
    },

    /// A `DataType` tag outside the known vocabulary.
    #[error("unknown data type: {0:?}")]
    UnknownDataType(String),

    /// A frame carried the wrong role prefix, e.g. a response where a
    /// request was expected.
    #[error("expected {expected} frame, found prefix byte {found:#04x}")]
    UnexpectedRole { expected: Role, found: u8 },

    /// A frame ended without the envelope delimiter.
    #[error("frame has no envelope delimiter")]
    MissingDelimiter,

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
