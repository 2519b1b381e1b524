//! Wire protocol for Syncbox.
//!
//! This crate defines how a sync client and server talk over a reliable,
//! in-order byte stream:
//!
//! - **Packets** ([`Packet`]): fixed 1032-byte records holding a packet count,
//!   sequence index, and a 1024-byte data block.
//! - **Chunking** ([`serialize`], [`deserialize`]): splitting a payload
//!   into packets and concatenating them back.
//! - **Envelopes** ([`Request`], [`Response`], [`Payload`]): the messages
//!   exchanged, with their JSON encodings.
//! - **Frames** ([`frame`]): role prefix and delimiter around an encoded
//!   envelope, so the receiver knows where it ends.
//! - **Errors** ([`ProtocolError`]): what can go wrong in all of the above.
//!
//! # Architecture
//!
//! Everything here is pure: no I/O, no shared state, no logging. The
//! transport crate moves packets; this crate only translates.
//!
//! ```text
//! Request/Response → frame → serialize → Packet… → stream
//! stream → Packet… → deserialize → frame → Request/Response
//! ```

mod codec;
mod constants;
mod error;
pub mod frame;
mod packet;
mod stream;
mod types;

pub use codec::{Codec, JsonCodec};
pub use constants::*;
pub use error::{ProtocolError, Result};
pub use frame::Envelope;
pub use packet::Packet;
pub use stream::{deserialize, serialize, validate_sequence};
pub use types::{
    DataType, DigestRequest, Dir, File, FileRequest, IdentityRequest, Payload, Request, Response,
    SyncAction, SyncRequest, TypedPayload,
};
