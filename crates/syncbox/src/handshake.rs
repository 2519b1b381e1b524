//! Identity handshake.
//!
//! The first exchange on every connection:
//!
//! ```text
//! client                                   server
//!   │ Request{alice, IDENTITY,               │
//!   │   IdentityRequest{alice}}  ───────────►│ authorize("alice")
//!   │                                        │
//!   │◄─────────── Response{200, ACCEPT,      │
//!   │               IdentityRequest{SYNCBOX-SERVER}}
//!   │                                        │
//!   │◄─────────── or Response{400, DENY}     │
//! ```
//!
//! Nobody but the server may claim [`SERVER_USERNAME`], and the name
//! inside the payload must match the one on the envelope.

use syncbox_protocol::{
    Codec, DataType, IdentityRequest, MESSAGE_DENY, Payload, Response, SERVER_USERNAME,
    STATUS_BAD, TypedPayload,
};
use syncbox_transport::{Connection, TransportError};

use crate::SyncboxError;
use crate::peer::Peer;

impl<C, K> Peer<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    /// Client side: announces this peer's username and waits for the
    /// server's verdict.
    ///
    /// Returns the identity the server presented.
    ///
    /// # Errors
    /// [`SyncboxError::HandshakeRejected`] if the server answers with
    /// anything but `200 ACCEPT`.
    pub async fn handshake(&self) -> Result<IdentityRequest, SyncboxError> {
        self.send_payload(&Payload::Identity(IdentityRequest {
            username: self.username().to_string(),
        }))
        .await?;

        let response = self.recv_response().await?;
        if !response.is_accept() {
            self.logger().info(format_args!(
                "handshake as {} rejected: {} {}",
                self.username(),
                response.status,
                response.message
            ));
            return Err(SyncboxError::HandshakeRejected {
                status: response.status,
                message: response.message,
            });
        }

        let server = IdentityRequest::from_data(&response.data)?;
        self.logger().info(format_args!(
            "handshake as {} accepted by {}",
            self.username(),
            server.username
        ));
        Ok(server)
    }

    /// Server side: reads the client's identity, asks `authorize` whether
    /// to let it in, and answers `ACCEPT` or `DENY`.
    ///
    /// Returns the accepted username.
    pub async fn accept_handshake<F>(&self, authorize: F) -> Result<String, SyncboxError>
    where
        F: FnOnce(&str) -> bool,
    {
        let request = self.recv_request().await?;

        let identity = match request.payload() {
            Ok(Payload::Identity(identity)) => identity,
            Ok(_) => {
                self.send_response(&Response::deny()).await?;
                return Err(SyncboxError::UnexpectedDataType {
                    expected: DataType::Identity,
                    actual: request.data_type,
                });
            }
            Err(e) => {
                self.send_response(&Response::deny()).await?;
                return Err(e.into());
            }
        };

        let username = identity.username;
        if username != request.username
            || username == SERVER_USERNAME
            || !authorize(username.as_str())
        {
            self.logger()
                .info(format_args!("denied handshake from {username:?}"));
            self.send_response(&Response::deny()).await?;
            return Err(SyncboxError::HandshakeRejected {
                status: STATUS_BAD,
                message: MESSAGE_DENY.to_string(),
            });
        }

        let server = IdentityRequest {
            username: self.username().to_string(),
        };
        self.send_response(&Response::accept(server.to_data()?))
            .await?;
        self.logger()
            .info(format_args!("accepted handshake from {username}"));
        Ok(username)
    }
}
