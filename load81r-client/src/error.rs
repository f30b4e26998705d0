//! Client error types.

use load81r_types::ProtocolError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors from a [`Session`](crate::Session) operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The byte stream failed. The connection is unusable.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The device's reply could not be framed or decoded. The connection
    /// should be considered desynchronized.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device answered `-ERR`. The connection is still usable.
    #[error("{0}")]
    Server(String),

    /// The device did not accept the `HELLO` handshake.
    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    /// The session has been closed.
    #[error("not connected")]
    NotConnected,
}

impl ClientError {
    /// Whether the connection must be torn down after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            ClientError::Protocol(e) => e.breaks_framing(),
            ClientError::Server(_) => false,
            _ => true,
        }
    }

    /// The device's message, if this is a server-side refusal.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_recoverable() {
        let err = ClientError::Server("not found".into());
        assert!(!err.is_fatal());
        assert_eq!(err.server_message(), Some("not found"));
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn transport_and_protocol_errors_are_fatal() {
        assert!(ClientError::from(TransportError::Timeout).is_fatal());
        assert!(ClientError::from(ProtocolError::EmptyResponse).is_fatal());
    }

    #[test]
    fn garbage_payload_is_not_fatal() {
        let err = ClientError::from(ProtocolError::MalformedPayload {
            what: "stat",
            reason: "expected value".into(),
        });
        assert!(!err.is_fatal());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
