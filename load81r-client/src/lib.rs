//! # load81r-client
//!
//! Client library for the LOAD81R remote file protocol spoken by the
//! PicoCalc's LOAD81 environment.
//!
//! ## Features
//!
//! - **Blocking TCP transport** with connect and I/O timeouts
//! - **Frame decoder** for `+OK`, `-ERR`, `+DATA ... +END` and `+READY` replies
//! - **Session verbs**: file listing, transfer, REPL evaluation, screenshots
//! - **Tree sync** in both directions with per-entry failure reporting
//!
//! ## Example
//!
//! ```ignore
//! use load81r_client::{Session, SessionConfig, TcpTransport};
//!
//! let config = SessionConfig::for_host("picocalc.local");
//! let mut session = Session::connect(config, TcpTransport::new())?;
//!
//! for entry in session.ls(None)? {
//!     println!("{}", entry.name);
//! }
//! session.put("/load81/hello.lua", b"print('hi')")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod session;
pub mod sync;
pub mod transport;

pub use error::ClientError;
pub use session::{Session, SessionConfig, DEFAULT_TIMEOUT};
pub use sync::{
    Direction, StopReason, SyncEngine, SyncError, SyncFailure, SyncPlan, SyncReport,
};
pub use transport::{Endpoint, MockTransport, TcpTransport, Transport, TransportError};
