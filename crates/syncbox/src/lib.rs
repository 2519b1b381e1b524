//! # Syncbox
//!
//! Wire protocol for a directory-synchronization client and server.
//!
//! This crate ties the layers together:
//!
//! - [`syncbox_protocol`]: packets, chunking, envelopes (pure, no I/O)
//! - [`syncbox_transport`]: packet sequences over a tokio byte stream
//! - [`Peer`]: typed request/response exchange and the identity
//!   handshake, with its own [`Logger`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use syncbox::prelude::*;
//!
//! # async fn run(stream: tokio::net::TcpStream) -> Result<(), SyncboxError> {
//! let peer = Peer::new(PacketConnection::new(stream), PeerConfig::client("alice"));
//! let server = peer.handshake().await?;
//! assert_eq!(server.username, SERVER_USERNAME);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handshake;
pub mod logging;
mod peer;

pub use config::{LogConfig, PeerConfig};
pub use error::SyncboxError;
pub use logging::Logger;
pub use peer::Peer;

pub use syncbox_protocol;
pub use syncbox_transport;

pub mod prelude {
    pub use crate::{LogConfig, Logger, Peer, PeerConfig, SyncboxError};
    pub use syncbox_protocol::{
        DataType, DigestRequest, Dir, File, FileRequest, IdentityRequest, JsonCodec, Payload,
        Request, Response, SERVER_USERNAME, SyncAction, SyncRequest, TypedPayload,
    };
    pub use syncbox_transport::{Connection, PacketConnection};
}
