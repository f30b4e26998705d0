//! Mock transport for testing.
//!
//! Allows scripting the device's byte stream and capturing sent bytes for
//! verification.

use super::{Endpoint, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Mock transport for testing.
///
/// Inbound bytes are queued up front and handed out by `recv()`; an empty
/// queue reads as end of stream. Clones share state, so a test can keep a
/// handle while a `Session` owns the other.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    connected: bool,
    connected_endpoint: Option<Endpoint>,
    timeout: Option<Duration>,
    sent_messages: Vec<Vec<u8>>,
    inbound: VecDeque<u8>,
    fragment_size: Option<usize>,
    fail_next_connect: Option<String>,
    fail_send: Option<(usize, String)>,
    fail_next_recv: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append raw bytes to the inbound stream.
    pub fn queue_response(&self, data: &[u8]) {
        self.lock().inbound.extend(data.iter().copied());
    }

    /// Append one `\n`-terminated line to the inbound stream.
    pub fn queue_line(&self, line: &str) {
        let mut inner = self.lock();
        inner.inbound.extend(line.bytes());
        inner.inbound.push_back(b'\n');
    }

    /// Append a complete `+DATA` frame carrying `payload`.
    pub fn queue_data(&self, payload: &[u8]) {
        self.queue_line(&format!("+DATA {}", payload.len()));
        self.queue_response(payload);
        self.queue_line("+END");
    }

    /// Deliver at most `size` bytes per `recv()` call.
    pub fn set_fragment_size(&self, size: usize) {
        self.lock().fragment_size = Some(size.max(1));
    }

    /// Number of inbound bytes not yet consumed.
    pub fn pending_inbound(&self) -> usize {
        self.lock().inbound.len()
    }

    /// Forget everything sent so far.
    pub fn clear_sent(&self) {
        self.lock().sent_messages.clear();
    }

    /// Get every `send()` payload, in order.
    pub fn sent_messages(&self) -> Vec<Vec<u8>> {
        self.lock().sent_messages.clone()
    }

    /// All sent bytes concatenated and decoded as text.
    pub fn sent_text(&self) -> String {
        let inner = self.lock();
        String::from_utf8_lossy(&inner.sent_messages.concat()).into_owned()
    }

    /// Get the last payload that was sent.
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.lock().sent_messages.last().cloned()
    }

    /// Get the endpoint that was connected to.
    pub fn connected_endpoint(&self) -> Option<Endpoint> {
        self.lock().connected_endpoint.clone()
    }

    /// Get the timeout passed to `connect()`.
    pub fn timeout(&self) -> Option<Duration> {
        self.lock().timeout
    }

    /// Cause the next connect() to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        self.lock().fail_next_connect = Some(error.to_string());
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.fail_send_after(0, error);
    }

    /// Let `successes` sends through, then fail the one after.
    pub fn fail_send_after(&self, successes: usize, error: &str) {
        self.lock().fail_send = Some((successes, error.to_string()));
    }

    /// Cause the next recv() to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        self.lock().fail_next_recv = Some(error.to_string());
    }

    /// Clear all state (messages, queue, connection).
    pub fn reset(&self) {
        *self.lock() = MockTransportInner::default();
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, endpoint: &Endpoint, timeout: Duration) -> Result<(), TransportError> {
        let mut inner = self.lock();

        // Check for forced failure
        if let Some(error) = inner.fail_next_connect.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.connected = true;
        inner.connected_endpoint = Some(endpoint.clone());
        inner.timeout = Some(timeout);
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut inner = self.lock();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_recv.take() {
            return Err(TransportError::ReceiveFailed(error));
        }

        let limit = inner.fragment_size.unwrap_or(usize::MAX).min(buf.len());
        let mut n = 0;
        while n < limit {
            match inner.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.lock();

        if !inner.connected {
            return Err(TransportError::NotConnected);
        }

        // Check for forced failure
        match inner.fail_send.take() {
            Some((0, error)) => return Err(TransportError::SendFailed(error)),
            Some((n, error)) => inner.fail_send = Some((n - 1, error)),
            None => {}
        }

        inner.sent_messages.push(data.to_vec());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn close(&mut self) {
        self.lock().connected = false;
    }
}
