//! # load81r-types
//!
//! Wire format types for the LOAD81R remote file protocol spoken by the
//! PicoCalc file server.
//!
//! This crate is pure: no sockets, no filesystem. It provides:
//! - [`Verb`] - the verb table with per-verb arity and reply shape
//! - [`Command`] - validated command lines
//! - [`StatusLine`] / [`Response`] - response classification and outcomes
//! - [`DirEntry`] / [`FileStat`] - structured payloads
//! - [`join_remote`] - remote path joining
//! - [`Screenshot`] - framebuffer dumps
//! - [`ProtocolError`] - framing and payload errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod entry;
mod error;
mod path;
mod response;
mod screenshot;
mod verb;

pub use command::Command;
pub use entry::{DirEntry, FileStat};
pub use error::ProtocolError;
pub use path::{join_remote, ROOT};
pub use response::{Response, StatusLine, UNKNOWN_ERROR};
pub use screenshot::{Screenshot, FRAMEBUFFER_LEN, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use verb::{Arity, Reply, Verb, VerbSpec};

/// Default TCP port of the device's file server.
pub const DEFAULT_PORT: u16 = 1900;

/// Version string sent in the `HELLO` handshake.
pub const CLIENT_VERSION: &str = "load81r/1.0";
