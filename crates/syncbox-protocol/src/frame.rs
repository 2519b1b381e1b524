//! Envelope frames: the self-delimiting payload handed to the serializer.
//!
//! ```text
//! ┌────────────┬──────────────────────────┬──────┐
//! │ prefix (1) │ encoded envelope (N)     │ 0x04 │  … zero padding
//! └────────────┴──────────────────────────┴──────┘
//! ```
//!
//! The prefix says whether the frame holds a request (`q`) or a response
//! (`s`). The delimiter marks where the envelope ends, so the zero padding
//! that [`deserialize`](crate::deserialize) leaves on the last packet is
//! dropped without guessing at trailing bytes.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::constants::{BYTE_DELIM, Role};
use crate::error::{ProtocolError, Result};
use crate::packet::Packet;
use crate::stream;
use crate::types::{Request, Response};

/// A message that can be framed: it knows which side of the exchange it
/// belongs to.
pub trait Envelope: Serialize + DeserializeOwned {
    const ROLE: Role;
}

impl Envelope for Request {
    const ROLE: Role = Role::Request;
}

impl Envelope for Response {
    const ROLE: Role = Role::Response;
}

/// Encodes `message` into a frame: prefix, encoded body, delimiter.
///
/// # Errors
/// Propagates codec errors, and returns [`ProtocolError::InvalidMessage`]
/// if the codec output contains the delimiter byte.
pub fn encode<C: Codec, M: Envelope>(codec: &C, message: &M) -> Result<Vec<u8>> {
    let body = codec.encode(message)?;
    if body.contains(&BYTE_DELIM) {
        return Err(ProtocolError::InvalidMessage(
            "encoded envelope contains the delimiter byte".into(),
        ));
    }

    let mut frame = Vec::with_capacity(body.len() + 2);
    frame.push(M::ROLE.prefix());
    frame.extend_from_slice(&body);
    frame.push(BYTE_DELIM);
    Ok(frame)
}

/// Decodes one envelope from the start of `frame`. Everything after the
/// first delimiter is ignored.
///
/// # Errors
/// - [`ProtocolError::UnexpectedRole`] if the prefix is not `M`'s role.
/// - [`ProtocolError::MissingDelimiter`] if no delimiter follows.
/// - [`ProtocolError::MalformedEnvelope`] if the body does not decode.
pub fn decode<C: Codec, M: Envelope>(codec: &C, frame: &[u8]) -> Result<M> {
    let Some((&prefix, rest)) = frame.split_first() else {
        return Err(ProtocolError::MissingDelimiter);
    };
    if prefix != M::ROLE.prefix() {
        return Err(ProtocolError::UnexpectedRole {
            expected: M::ROLE,
            found: prefix,
        });
    }

    let end = rest
        .iter()
        .position(|&b| b == BYTE_DELIM)
        .ok_or(ProtocolError::MissingDelimiter)?;

    codec.decode(&rest[..end]).map_err(|e| match e {
        ProtocolError::Decode(source) => ProtocolError::MalformedEnvelope(source),
        other => other,
    })
}

/// Frames `message` and chunks it into packets ready for the stream.
pub fn to_packets<C: Codec, M: Envelope>(codec: &C, message: &M) -> Result<Vec<Packet>> {
    stream::serialize(&encode(codec, message)?)
}

/// Reassembles `packets` and decodes the envelope they carry.
pub fn from_packets<C: Codec, M: Envelope>(codec: &C, packets: &[Packet]) -> Result<M> {
    decode(codec, &stream::deserialize(packets))
}
