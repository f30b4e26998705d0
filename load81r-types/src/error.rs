//! Error types for the LOAD81R wire format.

use thiserror::Error;

/// Errors raised while encoding commands or decoding responses.
///
/// A protocol error means the two ends no longer agree on framing (or the
/// payload was not what the verb promised). It is never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The status line matched none of the known response prefixes.
    #[error("unrecognized response: {0:?}")]
    UnrecognizedResponse(String),

    /// The stream ended (or produced a blank line) where a status line was expected.
    #[error("empty response")]
    EmptyResponse,

    /// `+DATA` carried a missing or non-numeric length.
    #[error("invalid data length: {0:?}")]
    InvalidDataLength(String),

    /// The line after a binary payload was not `+END`.
    #[error("missing end marker (got {0:?})")]
    MissingEndMarker(String),

    /// The response variant does not fit the command that was sent.
    #[error("unexpected response to {verb}: expected {expected}, got {actual}")]
    UnexpectedResponse {
        /// Verb of the command that was sent.
        verb: &'static str,
        /// Outcome shape the verb requires.
        expected: &'static str,
        /// Outcome shape actually received.
        actual: &'static str,
    },

    /// A structured payload (listing or stat record) did not decode.
    #[error("malformed {what} payload: {reason}")]
    MalformedPayload {
        /// Which payload failed.
        what: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// A command argument would corrupt the line framing.
    #[error("invalid argument for {verb}: {reason}")]
    InvalidArgument {
        /// Verb the argument was meant for.
        verb: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ProtocolError {
    /// Whether the byte stream is out of step after this error.
    ///
    /// Payload decode failures and refused arguments leave the stream
    /// aligned on a frame boundary. So does an unexpected but complete
    /// response, unless it was `+READY`, which leaves the device waiting
    /// for upload bytes.
    pub fn breaks_framing(&self) -> bool {
        match self {
            ProtocolError::MalformedPayload { .. } | ProtocolError::InvalidArgument { .. } => false,
            ProtocolError::UnexpectedResponse { actual, .. } => *actual == "ready",
            _ => true,
        }
    }
}
