//! Session - one connection to a device's file server.
//!
//! [`Session`] performs the handshake, caches the working directory and
//! exposes one method per protocol verb.
//!
//! # Architecture
//!
//! ```text
//! caller → Session → codec → Transport → device
//! ```
//!
//! Exactly one command is in flight at a time: every method writes one
//! command and fully drains its response (payload and end marker
//! included) before returning. Methods take `&mut self`, so the borrow
//! checker enforces this.
//!
//! After a fatal error (transport failure or broken framing) the session
//! closes itself and every later call returns [`ClientError::NotConnected`].
//!
//! # Example
//!
//! ```ignore
//! use load81r_client::{Session, SessionConfig, TcpTransport};
//!
//! let config = SessionConfig::new("192.168.1.100", 1900);
//! let mut session = Session::connect(config, TcpTransport::new())?;
//! for entry in session.ls(Some("/load81"))? {
//!     println!("{}", entry.name);
//! }
//! session.close();
//! ```

use std::time::Duration;

use load81r_types::{
    Command, DirEntry, FileStat, ProtocolError, Reply, Response, Screenshot, Verb,
    CLIENT_VERSION, DEFAULT_PORT, ROOT,
};

use crate::codec;
use crate::error::ClientError;
use crate::transport::{Endpoint, Transport};

/// Default timeout for connect and every blocking read or write.
///
/// Generous because the device reads from a slow SD card.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device address.
    pub endpoint: Endpoint,
    /// Timeout applied to connect and to every blocking call after it.
    pub timeout: Duration,
    /// Version string sent in `HELLO`.
    pub client_version: String,
}

impl SessionConfig {
    /// Configuration with default timeout and client version.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            endpoint: Endpoint::new(host, port),
            timeout: DEFAULT_TIMEOUT,
            client_version: CLIENT_VERSION.to_string(),
        }
    }

    /// Configuration for the default port.
    pub fn for_host(host: &str) -> Self {
        Self::new(host, DEFAULT_PORT)
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the version string sent in the handshake.
    pub fn with_client_version(mut self, version: &str) -> Self {
        self.client_version = version.to_string();
        self
    }
}

/// An open connection to a device.
///
/// Dropping the session closes it (best-effort `QUIT`).
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    cwd: String,
    last_error: Option<String>,
    open: bool,
}

impl<T: Transport> Session<T> {
    /// Open the transport, perform the `HELLO` handshake and seed the
    /// working-directory cache.
    ///
    /// A failed `PWD` after the handshake is tolerated; the cache then
    /// starts at `/`.
    pub fn connect(config: SessionConfig, mut transport: T) -> Result<Self, ClientError> {
        let hello = Command::new(Verb::Hello, [config.client_version.as_str()])?;

        tracing::debug!("Connecting to {}", config.endpoint);
        transport.connect(&config.endpoint, config.timeout)?;

        let mut session = Self {
            config,
            transport,
            cwd: ROOT.to_string(),
            last_error: None,
            open: true,
        };

        // A `+READY` reply has already abandoned the connection, so `close`
        // below sends no `QUIT` to a device waiting for upload bytes.
        match session.expect(&hello) {
            Ok(response) => {
                tracing::debug!(
                    "Handshake accepted (server {})",
                    response.into_text().as_deref().unwrap_or("unknown")
                );
            }
            Err(ClientError::Server(message)) => {
                session.close();
                return Err(ClientError::HandshakeRejected(message));
            }
            Err(ClientError::Protocol(ProtocolError::UnexpectedResponse { actual, .. })) => {
                session.close();
                return Err(ClientError::HandshakeRejected(format!(
                    "unexpected {actual} response"
                )));
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = session.pwd() {
            if e.is_fatal() {
                return Err(e);
            }
            tracing::debug!("PWD after handshake failed: {}", e);
        }

        Ok(session)
    }

    /// Send one command and decode its response.
    ///
    /// `-ERR` comes back as `Ok(Response::Error(..))` and is also stored in
    /// [`last_error`](Self::last_error).
    fn execute(&mut self, command: &Command) -> Result<Response, ClientError> {
        if !self.open {
            return Err(ClientError::NotConnected);
        }
        let result = codec::round_trip(&mut self.transport, command);
        self.observe(result)
    }

    fn observe(&mut self, result: Result<Response, ClientError>) -> Result<Response, ClientError> {
        match &result {
            Ok(Response::Error(message)) => {
                tracing::debug!("Device refused: {}", message);
                self.last_error = Some(message.clone());
            }
            Err(e) if e.is_fatal() => {
                tracing::warn!("Closing connection after error: {}", e);
                self.abandon();
            }
            _ => {}
        }
        result
    }

    /// Drop the transport without a `QUIT`; used once framing is lost.
    fn abandon(&mut self) {
        self.open = false;
        self.transport.close();
    }

    fn unexpected(&mut self, verb: Verb, expected: &'static str, got: &Response) -> ClientError {
        let err = ClientError::Protocol(ProtocolError::UnexpectedResponse {
            verb: verb.name(),
            expected,
            actual: got.kind(),
        });
        if err.is_fatal() {
            self.abandon();
        }
        err
    }

    /// Send one command and check the response against the verb table.
    fn expect(&mut self, command: &Command) -> Result<Response, ClientError> {
        let verb = command.verb();
        let response = self.execute(command)?;
        self.check(verb, verb.spec().reply, response)
    }

    /// `-ERR` becomes [`ClientError::Server`]; any other shape than `reply`
    /// is unexpected. `Ack` drops inline text.
    fn check(
        &mut self,
        verb: Verb,
        reply: Reply,
        response: Response,
    ) -> Result<Response, ClientError> {
        match response {
            Response::Error(message) => Err(ClientError::Server(message)),
            Response::Ok(_) if reply == Reply::Ack => Ok(Response::Ok(None)),
            response if reply.accepts(&response) => Ok(response),
            other => Err(self.unexpected(verb, reply.kind(), &other)),
        }
    }

    /// Refresh and return the working directory.
    pub fn pwd(&mut self) -> Result<String, ClientError> {
        let text = self.expect(&Command::bare(Verb::Pwd)?)?.into_text();
        self.cwd = text.unwrap_or_else(|| ROOT.to_string());
        Ok(self.cwd.clone())
    }

    /// Change directory, then re-read it with `PWD` (the device does not
    /// echo it on `CD`).
    pub fn cd(&mut self, path: &str) -> Result<String, ClientError> {
        self.expect(&Command::new(Verb::Cd, [path])?)?;
        self.pwd()
    }

    /// List a directory (the working directory if `path` is `None`).
    pub fn ls(&mut self, path: Option<&str>) -> Result<Vec<DirEntry>, ClientError> {
        let payload = self.expect(&Command::new(Verb::Ls, path)?)?.into_payload();
        Ok(DirEntry::decode_listing(&payload)?)
    }

    /// Read a whole file.
    pub fn cat(&mut self, path: &str) -> Result<Vec<u8>, ClientError> {
        Ok(self.expect(&Command::new(Verb::Cat, [path])?)?.into_payload())
    }

    /// Write a whole file.
    ///
    /// Two stages: `PUT <path> <len>` must be answered with `+READY`, then
    /// the bytes are streamed and one more response confirms the write.
    /// There is no way to abort once bytes are on the wire.
    pub fn put(&mut self, path: &str, data: &[u8]) -> Result<(), ClientError> {
        let len = data.len().to_string();
        let command = Command::new(Verb::Put, [path, len.as_str()])?;
        self.expect(&command)?;

        tracing::debug!("-> {} raw bytes", data.len());
        if let Err(e) = self.transport.send(data) {
            self.abandon();
            return Err(e.into());
        }

        let confirmation = codec::read_response(&mut self.transport);
        let confirmation = self.observe(confirmation)?;
        self.check(Verb::Put, Reply::Ack, confirmation).map(|_| ())
    }

    /// Create a directory.
    pub fn mkdir(&mut self, path: &str) -> Result<(), ClientError> {
        self.expect(&Command::new(Verb::Mkdir, [path])?).map(|_| ())
    }

    /// Remove a file or empty directory.
    pub fn rm(&mut self, path: &str) -> Result<(), ClientError> {
        self.expect(&Command::new(Verb::Rm, [path])?).map(|_| ())
    }

    /// Metadata for one path.
    pub fn stat(&mut self, path: &str) -> Result<FileStat, ClientError> {
        let text = self.expect(&Command::new(Verb::Stat, [path])?)?.into_text();
        Ok(FileStat::decode(text.as_deref().unwrap_or(""))?)
    }

    /// Evaluate Lua code on the device and return its printed output.
    pub fn evaluate(&mut self, code: &str) -> Result<Option<String>, ClientError> {
        Ok(self.expect(&Command::new(Verb::Repl, [code])?)?.into_text())
    }

    /// Capture the display.
    pub fn screenshot(&mut self) -> Result<Screenshot, ClientError> {
        let pixels = self.expect(&Command::bare(Verb::Sshot)?)?.into_payload();
        Ok(Screenshot::from_rgb565(pixels)?)
    }

    /// Liveness check.
    pub fn ping(&mut self) -> Result<(), ClientError> {
        self.expect(&Command::bare(Verb::Ping)?).map(|_| ())
    }

    /// The cached working directory. Only guaranteed current right after
    /// [`pwd`](Self::pwd) or [`cd`](Self::cd).
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// The most recent `-ERR` message from the device.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the session can still issue commands.
    pub fn is_connected(&self) -> bool {
        self.open && self.transport.is_connected()
    }

    /// The configuration this session was opened with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send a best-effort `QUIT` and release the transport. Safe to call
    /// more than once.
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            if let Ok(quit) = Command::bare(Verb::Quit) {
                let _ = codec::round_trip(&mut self.transport, &quit);
            }
        }
        self.transport.close();
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}
