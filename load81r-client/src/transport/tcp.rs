//! TCP transport to a device on the local network.

use super::{Endpoint, Transport, TransportError};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Blocking TCP transport.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Create an unconnected transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint, timeout: Duration) -> Result<(), TransportError> {
        if timeout.is_zero() {
            return Err(TransportError::ConnectionFailed(
                "timeout must be non-zero".into(),
            ));
        }
        self.close();

        let addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| {
                TransportError::ConnectionFailed(format!("cannot resolve {endpoint}: {e}"))
            })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(timeout))
                        .and_then(|_| stream.set_write_timeout(Some(timeout)))
                        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
                    // Commands are tiny and strictly request/response.
                    let _ = stream.set_nodelay(true);
                    tracing::debug!("Connected to {} ({})", endpoint, addr);
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                TransportError::Timeout
            }
            Some(e) => TransportError::ConnectionFailed(format!("{endpoint}: {e}")),
            None => TransportError::ConnectionFailed(format!("{endpoint}: no addresses")),
        })
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let stream = self.stream()?;
        loop {
            match stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::from_recv(e)),
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let stream = self.stream()?;
        stream
            .write_all(data)
            .and_then(|_| stream.flush())
            .map_err(TransportError::from_send)
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
