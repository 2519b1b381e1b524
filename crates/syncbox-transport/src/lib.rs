//! Transport layer for Syncbox.
//!
//! Provides the [`Connection`] trait that higher layers talk to, and
//! [`PacketConnection`], which moves whole messages over any reliable,
//! in-order tokio byte stream as sequences of fixed-size packets.
//!
//! Accepting sockets and managing connection lifetimes is left to the
//! caller: hand a connected stream to [`PacketConnection::new`].

#![allow(async_fn_in_trait)]

mod error;
mod packet_stream;

pub use error::TransportError;
pub use packet_stream::{DEFAULT_MAX_PACKETS, PacketConnection};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single connection that can send and receive whole messages.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed between
    /// messages.
    ///
    /// Dropping the returned future part way through must not lose data:
    /// the next call continues with the same message.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the sending side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
