//! One end of a Syncbox connection.
//!
//! A [`Peer`] turns the byte-level [`Connection`] into typed exchanges:
//! it frames envelopes with the codec, sends them as one message, and
//! decodes what comes back. Framing and envelope errors are fatal for the
//! exchange and are returned as-is; nothing is retried.
//!
//! [`SyncboxError::Timeout`] is not fatal. The receive is abandoned, but a
//! cancel-safe connection such as `PacketConnection` keeps whatever part of
//! the message had arrived, and the next receive picks it up.

use syncbox_protocol::{Codec, Envelope, JsonCodec, Payload, Request, Response, frame};
use syncbox_transport::{Connection, TransportError};

use crate::SyncboxError;
use crate::config::PeerConfig;
use crate::logging::Logger;

/// Typed request/response exchange over a connection.
pub struct Peer<C, K = JsonCodec> {
    conn: C,
    codec: K,
    config: PeerConfig,
    logger: Logger,
}

impl<C> Peer<C>
where
    C: Connection<Error = TransportError>,
{
    /// Wraps `conn` using the JSON codec every Syncbox peer speaks.
    pub fn new(conn: C, config: PeerConfig) -> Self {
        Self::with_codec(conn, JsonCodec, config)
    }
}

impl<C, K> Peer<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    pub fn with_codec(conn: C, codec: K, config: PeerConfig) -> Self {
        let logger = Logger::new(config.log.clone());
        Self {
            conn,
            codec,
            config,
            logger,
        }
    }

    /// The name this peer puts in outgoing requests.
    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub async fn send_request(&self, request: &Request) -> Result<(), SyncboxError> {
        self.logger.verbose(format_args!(
            "{} sending {} request",
            self.conn.id(),
            request.data_type
        ));
        self.send_envelope(request).await
    }

    /// Sends `payload` in a request signed with this peer's username.
    pub async fn send_payload(&self, payload: &Payload) -> Result<(), SyncboxError> {
        let request = Request::with_payload(self.username(), payload)?;
        self.send_request(&request).await
    }

    pub async fn recv_request(&self) -> Result<Request, SyncboxError> {
        let request: Request = self.recv_envelope().await?;
        self.logger.verbose(format_args!(
            "{} received {} request from {}",
            self.conn.id(),
            request.data_type,
            request.username
        ));
        Ok(request)
    }

    pub async fn send_response(&self, response: &Response) -> Result<(), SyncboxError> {
        self.logger.verbose(format_args!(
            "{} sending {} {}",
            self.conn.id(),
            response.status,
            response.message
        ));
        self.send_envelope(response).await
    }

    pub async fn recv_response(&self) -> Result<Response, SyncboxError> {
        let response: Response = self.recv_envelope().await?;
        self.logger.verbose(format_args!(
            "{} received {} {}",
            self.conn.id(),
            response.status,
            response.message
        ));
        Ok(response)
    }

    /// Sends `request` and waits for the response to it.
    pub async fn request(&self, request: &Request) -> Result<Response, SyncboxError> {
        self.send_request(request).await?;
        self.recv_response().await
    }

    /// Closes the sending side of the connection.
    pub async fn close(&self) -> Result<(), SyncboxError> {
        self.logger
            .debug(format_args!("{} closing", self.conn.id()));
        self.conn.close().await?;
        Ok(())
    }

    async fn send_envelope<M: Envelope>(&self, message: &M) -> Result<(), SyncboxError> {
        let frame = frame::encode(&self.codec, message)?;
        self.conn.send(&frame).await?;
        Ok(())
    }

    async fn recv_envelope<M: Envelope>(&self) -> Result<M, SyncboxError> {
        let received = tokio::time::timeout(self.config.recv_timeout, self.conn.recv()).await;
        let frame = match received {
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => {
                self.logger
                    .info(format_args!("{} closed by peer", self.conn.id()));
                return Err(SyncboxError::ConnectionClosed);
            }
            Ok(Err(e)) => {
                self.logger
                    .error(format_args!("{} receive failed: {e}", self.conn.id()));
                return Err(e.into());
            }
            Err(_) => {
                self.logger.info(format_args!(
                    "{} timed out after {:?}",
                    self.conn.id(),
                    self.config.recv_timeout
                ));
                return Err(SyncboxError::Timeout);
            }
        };

        frame::decode(&self.codec, &frame).map_err(|e| {
            self.logger
                .error(format_args!("{} bad {} frame: {e}", self.conn.id(), M::ROLE));
            e.into()
        })
    }
}
