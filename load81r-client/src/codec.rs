//! Request/response framing over a [`Transport`].
//!
//! Decoding is a small state machine:
//!
//! ```text
//! AwaitStatusLine ─┬─ +OK / -ERR / +READY ──────────────────────► done
//!                  └─ +DATA n ─► AwaitPayload(n) ─► AwaitEndMarker ─► done
//! ```
//!
//! The payload is read with `read_exact`, which may come back short if the
//! device hangs up. The end marker check that follows is what decides
//! whether the frame is intact: anything but `+END` fails the exchange.
//! The device writes `+END` straight after the payload; a single line break
//! in between is accepted too.

use load81r_types::{Command, ProtocolError, Response, StatusLine};

use crate::error::ClientError;
use crate::transport::Transport;

enum DecodeState {
    AwaitStatusLine,
    AwaitPayload(usize),
    AwaitEndMarker { payload: Vec<u8>, blank_seen: bool },
}

/// Write one command line.
pub fn write_command<T: Transport + ?Sized>(
    transport: &mut T,
    command: &Command,
) -> Result<(), ClientError> {
    let line = command.to_line();
    tracing::debug!("-> {}", line.trim_end());
    transport.send(line.as_bytes())?;
    Ok(())
}

/// Read and decode exactly one response, including any binary payload and
/// its end marker.
pub fn read_response<T: Transport + ?Sized>(transport: &mut T) -> Result<Response, ClientError> {
    let mut state = DecodeState::AwaitStatusLine;
    loop {
        state = match state {
            DecodeState::AwaitStatusLine => {
                let line = transport.read_line()?;
                tracing::debug!("<- {}", line);
                match StatusLine::parse(&line)? {
                    StatusLine::Ok(text) => return Ok(Response::Ok(text)),
                    StatusLine::Err(message) => return Ok(Response::Error(message)),
                    StatusLine::Ready => return Ok(Response::Ready),
                    StatusLine::Data(len) => DecodeState::AwaitPayload(len),
                    StatusLine::End => {
                        return Err(ProtocolError::UnrecognizedResponse(line).into());
                    }
                }
            }
            DecodeState::AwaitPayload(len) => {
                let payload = transport.read_exact(len)?;
                if payload.len() < len {
                    tracing::debug!("Payload short: {} of {} bytes", payload.len(), len);
                }
                DecodeState::AwaitEndMarker {
                    payload,
                    blank_seen: false,
                }
            }
            DecodeState::AwaitEndMarker {
                payload,
                blank_seen,
            } => {
                let line = transport.read_line()?;
                // Tolerate one line break between the payload and the marker.
                if line.is_empty() && !blank_seen {
                    DecodeState::AwaitEndMarker {
                        payload,
                        blank_seen: true,
                    }
                } else {
                    return match StatusLine::parse(&line) {
                        Ok(StatusLine::End) => {
                            tracing::debug!("<- +END ({} bytes)", payload.len());
                            Ok(Response::Binary(payload))
                        }
                        _ => Err(ProtocolError::MissingEndMarker(line).into()),
                    };
                }
            }
        };
    }
}

/// Write a command and read its response.
pub fn round_trip<T: Transport + ?Sized>(
    transport: &mut T,
    command: &Command,
) -> Result<Response, ClientError> {
    write_command(transport, command)?;
    read_response(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Endpoint, MockTransport};
    use load81r_types::Verb;
    use std::time::Duration;

    fn connected() -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .connect(&Endpoint::new("picocalc", 1900), Duration::from_secs(1))
            .unwrap();
        transport
    }

    fn decode(bytes: &[u8]) -> Result<Response, ClientError> {
        let mut transport = connected();
        transport.queue_response(bytes);
        read_response(&mut transport)
    }

    // ===========================================
    // Terminal Status Lines
    // ===========================================

    #[test]
    fn ok_and_error_lines() {
        assert_eq!(decode(b"+OK\n").unwrap(), Response::Ok(None));
        assert_eq!(
            decode(b"+OK /load81\n").unwrap(),
            Response::Ok(Some("/load81".into()))
        );
        assert_eq!(
            decode(b"-ERR not found\n").unwrap(),
            Response::Error("not found".into())
        );
        assert_eq!(decode(b"+READY\n").unwrap(), Response::Ready);
    }

    #[test]
    fn unknown_status_line_is_protocol_error() {
        let err = decode(b"WHAT\n").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::UnrecognizedResponse(_))
        ));
    }

    #[test]
    fn stray_end_marker_is_protocol_error() {
        assert!(matches!(
            decode(b"+END\n"),
            Err(ClientError::Protocol(ProtocolError::UnrecognizedResponse(_)))
        ));
    }

    #[test]
    fn closed_stream_is_empty_response() {
        assert!(matches!(
            decode(b""),
            Err(ClientError::Protocol(ProtocolError::EmptyResponse))
        ));
    }

    // ===========================================
    // Binary Frames
    // ===========================================

    #[test]
    fn empty_listing_frame() {
        assert_eq!(
            decode(b"+DATA 2\n[]\n+END\n").unwrap(),
            Response::Binary(b"[]".to_vec())
        );
    }

    #[test]
    fn zero_length_frame() {
        assert_eq!(
            decode(b"+DATA 0\n+END\n").unwrap(),
            Response::Binary(vec![])
        );
    }

    #[test]
    fn payload_may_contain_newlines_and_markers() {
        let payload = b"line1\n+END\n\x00\xff";
        let mut transport = connected();
        transport.queue_data(payload);
        assert_eq!(
            read_response(&mut transport).unwrap(),
            Response::Binary(payload.to_vec())
        );
        assert_eq!(transport.pending_inbound(), 0);
    }

    #[test]
    fn wrong_end_marker_fails_regardless_of_payload() {
        assert!(matches!(
            decode(b"+DATA 2\nhi\n+OK\n"),
            Err(ClientError::Protocol(ProtocolError::MissingEndMarker(_)))
        ));
    }

    #[test]
    fn declared_length_longer_than_payload_eats_the_marker() {
        // The payload read swallows "hi\n+E"; what is left is not an end marker.
        assert!(matches!(
            decode(b"+DATA 5\nhi\n+END\n"),
            Err(ClientError::Protocol(ProtocolError::MissingEndMarker(line))) if line == "ND"
        ));
    }

    #[test]
    fn short_payload_then_close_fails_on_marker() {
        assert!(matches!(
            decode(b"+DATA 5\nhi"),
            Err(ClientError::Protocol(ProtocolError::MissingEndMarker(line))) if line.is_empty()
        ));
    }

    #[test]
    fn invalid_length_is_protocol_error() {
        assert!(matches!(
            decode(b"+DATA x\n"),
            Err(ClientError::Protocol(ProtocolError::InvalidDataLength(_)))
        ));
    }

    // ===========================================
    // Fragmented Delivery
    // ===========================================

    #[test]
    fn one_byte_fragments_decode_identically() {
        let stream: &[&[u8]] = &[
            b"+OK hello\n",
            b"-ERR denied\n",
            b"+READY\n",
            b"+DATA 11\nhello\nworld+END\n",
        ];
        for bytes in stream {
            let whole = decode(bytes).unwrap();

            let mut transport = connected();
            transport.set_fragment_size(1);
            transport.queue_response(bytes);
            assert_eq!(read_response(&mut transport).unwrap(), whole);
        }
    }

    #[test]
    fn line_reads_do_not_consume_next_frame() {
        let mut transport = connected();
        transport.set_fragment_size(3);
        transport.queue_response(b"+OK\n+DATA 3\nabc+END\n");

        assert_eq!(read_response(&mut transport).unwrap(), Response::Ok(None));
        assert_eq!(
            read_response(&mut transport).unwrap(),
            Response::Binary(b"abc".to_vec())
        );
    }

    // ===========================================
    // Round Trip
    // ===========================================

    #[test]
    fn round_trip_writes_then_reads() {
        let mut transport = connected();
        transport.queue_line("+OK");
        let cmd = Command::bare(Verb::Ping).unwrap();

        assert_eq!(round_trip(&mut transport, &cmd).unwrap(), Response::Ok(None));
        assert_eq!(transport.sent_text(), "PING\n");
    }

    #[test]
    fn transport_failure_propagates() {
        let mut transport = connected();
        transport.fail_next_send("broken pipe");
        let cmd = Command::bare(Verb::Ping).unwrap();
        assert!(matches!(
            round_trip(&mut transport, &cmd),
            Err(ClientError::Transport(_))
        ));
    }
}
