use syncbox_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
///
/// Every variant is fatal for the connection it came from. The packet
/// stream has no way to resynchronise after a partial record.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The stream ended part way through a message.
    #[error("short read: expected {expected} bytes, got {received}")]
    ShortRead { expected: usize, received: usize },

    /// A message announced more packets than this connection accepts.
    #[error("message of {0} packets exceeds the connection limit")]
    MessageTooLarge(u32),

    /// Packets could not be built or did not form a valid message.
    #[error("framing error: {0}")]
    Framing(#[from] ProtocolError),
}
