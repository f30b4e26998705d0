//! Response status lines and decoded outcomes.
//!
//! The first line of every response is one of:
//!
//! ```text
//! +OK[ <text>]      success, optional inline text
//! -ERR[ <message>]  failure
//! +DATA <length>    success, <length> raw bytes follow, then "+END"
//! +READY            the client must now stream raw bytes
//! ```
//!
//! Reading the payload and the end marker needs I/O and lives in the
//! client crate; this module only classifies single lines.

use crate::ProtocolError;

/// Message used when the device sends a bare `-ERR`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One classified response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// `+OK`, with the inline text if any.
    Ok(Option<String>),
    /// `-ERR` and its message.
    Err(String),
    /// `+DATA` and the declared payload length.
    Data(usize),
    /// `+READY`.
    Ready,
    /// `+END`, only valid after a binary payload.
    End,
}

impl StatusLine {
    /// Classify a line with its terminator already removed.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::EmptyResponse);
        }

        let (token, rest) = match line.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (line, ""),
        };

        match token {
            "+OK" => Ok(StatusLine::Ok((!rest.is_empty()).then(|| rest.to_string()))),
            "-ERR" => Ok(StatusLine::Err(if rest.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                rest.to_string()
            })),
            "+DATA" => rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .map(StatusLine::Data)
                .ok_or_else(|| ProtocolError::InvalidDataLength(rest.to_string())),
            "+READY" => Ok(StatusLine::Ready),
            "+END" => Ok(StatusLine::End),
            _ => Err(ProtocolError::UnrecognizedResponse(line.to_string())),
        }
    }
}

/// The decoded outcome of one command. Exactly one per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success with optional inline text.
    Ok(Option<String>),
    /// The device refused the command.
    Error(String),
    /// Success with a binary payload.
    Binary(Vec<u8>),
    /// The device is waiting for a raw upload.
    Ready,
}

impl Response {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Ok(_) => "ok",
            Response::Error(_) => "error",
            Response::Binary(_) => "binary",
            Response::Ready => "ready",
        }
    }

    /// True for every variant except [`Response::Error`].
    pub fn is_success(&self) -> bool {
        !matches!(self, Response::Error(_))
    }

    /// Inline text of an `+OK`; `None` for every other variant.
    pub fn into_text(self) -> Option<String> {
        match self {
            Response::Ok(text) => text,
            _ => None,
        }
    }

    /// Payload of a `+DATA` response; empty for every other variant.
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            Response::Binary(payload) => payload,
            _ => Vec::new(),
        }
    }
}
