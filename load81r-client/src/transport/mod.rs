//! Transport abstraction for LOAD81R.
//!
//! A transport owns one bidirectional byte stream to the device. All calls
//! block, bounded by the timeout given at connect time.
//!
//! # Design
//!
//! Implementations provide the raw primitives:
//! - `connect()` establishes the stream
//! - `recv()` reads whatever bytes are available (0 = end of stream)
//! - `send()` writes all bytes
//! - `close()` releases the stream
//!
//! Line and exact-length reads are provided on top of `recv()`. Lines are
//! read one byte at a time so a status line never swallows the start of the
//! binary payload that follows it.
//!
//! # Example
//!
//! ```ignore
//! let mut transport = TcpTransport::new();
//! transport.connect(&Endpoint::new("192.168.1.100", 1900), Duration::from_secs(30))?;
//! transport.send(b"PING\n")?;
//! let status = transport.read_line()?;
//! ```

mod mock;
mod tcp;

pub use mock::MockTransport;
pub use tcp::TcpTransport;

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Largest single `recv()` issued by [`Transport::read_exact`].
pub const READ_CHUNK: usize = 8192;

/// Transport errors. Any of these leaves the connection unusable.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed (refused, unreachable, resolution failure).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed by the peer mid-exchange.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A blocking call exceeded the configured timeout.
    #[error("operation timed out")]
    Timeout,
}

impl TransportError {
    pub(crate) fn from_recv(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                TransportError::ConnectionClosed
            }
            _ => TransportError::ReceiveFailed(e.to_string()),
        }
    }

    pub(crate) fn from_send(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::SendFailed(e.to_string()),
        }
    }
}

/// Host and port of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Blocking byte-stream transport to a device.
pub trait Transport {
    /// Open the stream. The timeout applies to the connect and to every
    /// later read and write.
    fn connect(&mut self, endpoint: &Endpoint, timeout: Duration) -> Result<(), TransportError>;

    /// Read up to `buf.len()` bytes. Returns 0 at end of stream.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all of `data`.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Release the stream. Idempotent, never fails.
    fn close(&mut self);

    /// Read one line, without its `\n` (and any trailing `\r`).
    ///
    /// Invalid UTF-8 is replaced, never an error. At end of stream with no
    /// bytes read, returns an empty string.
    fn read_line(&mut self) -> Result<String, TransportError> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            if self.recv(&mut byte)? == 0 || byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read until `len` bytes have arrived or the stream ends.
    ///
    /// A short result means the stream closed early; the caller decides
    /// what that means.
    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut data = Vec::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        while data.len() < len {
            let want = (len - data.len()).min(READ_CHUNK);
            let n = self.recv(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }
        Ok(data)
    }
}
