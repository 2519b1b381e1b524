//! Unified error type for Syncbox peers.

use syncbox_protocol::{DataType, ProtocolError};
use syncbox_transport::TransportError;

/// Top-level error that wraps the errors of every layer.
///
/// The `#[from]` attributes let `?` lift transport and protocol errors
/// into this type directly.
#[derive(Debug, thiserror::Error)]
pub enum SyncboxError {
    /// A transport-level error (send, recv, short read, framing).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed envelope).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The remote peer closed the connection while a message was expected.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// No message arrived within the configured receive timeout.
    #[error("timed out waiting for a message")]
    Timeout,

    /// A request carried a different payload kind than the exchange
    /// called for.
    #[error("unexpected data type: expected {expected}, got {actual}")]
    UnexpectedDataType { expected: DataType, actual: String },

    /// The handshake was refused, by the remote peer or by us.
    #[error("handshake rejected: {status} {message}")]
    HandshakeRejected { status: i64, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let syncbox_err: SyncboxError = err.into();
        assert!(matches!(syncbox_err, SyncboxError::Transport(_)));
        assert!(syncbox_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let syncbox_err: SyncboxError = err.into();
        assert!(matches!(syncbox_err, SyncboxError::Protocol(_)));
    }

    #[test]
    fn test_handshake_rejected_display() {
        let err = SyncboxError::HandshakeRejected {
            status: 400,
            message: "DENY".into(),
        };
        assert_eq!(err.to_string(), "handshake rejected: 400 DENY");
    }
}
