//! CLI command implementations.
//!
//! Every command runs against an open [`Session`] and writes to the given
//! output, so the interactive shell can reuse them and tests can drive them
//! with a mock transport.

use anyhow::Result;
use clap::Subcommand;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use load81r_client::{Session, Transport};

use crate::interrupt::Interrupt;

pub mod cat;
pub mod cp;
pub mod device;
pub mod edit;
pub mod files;
pub mod ls;
pub mod nav;
pub mod repl;
pub mod rsync;
pub mod shell;

/// Settings shared by all commands.
pub struct Context {
    /// Editor command from the config file.
    pub editor: Option<String>,
    /// Ctrl-C state for long transfers.
    pub interrupt: Interrupt,
}

/// Subcommands, shared by the command line and the shell.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print remote files
    Cat {
        /// Remote files
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Change the remote working directory
    Cd {
        /// Directory (default: /)
        #[arg(default_value = "/")]
        dir: String,
    },

    /// Print the remote working directory
    Pwd,

    /// Copy a file; prefix the remote side with `remote:`
    Cp {
        /// Source (e.g. remote:/load81/game.lua)
        src: String,
        /// Destination (e.g. ./game.lua)
        dst: String,
    },

    /// Edit a remote file with a local editor
    Edit {
        /// Remote file
        file: String,
    },

    /// List a remote directory
    Ls {
        /// Directory (default: working directory)
        path: Option<String>,
    },

    /// Create a remote directory
    Mkdir {
        /// Directory to create
        dir: String,
    },

    /// Delete remote files or empty directories
    Rm {
        /// Paths to delete
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Mirror a directory tree; the remote side is the `remote:` or absolute path
    Rsync {
        /// Source tree
        src: String,
        /// Destination tree
        dst: String,
    },

    /// Show metadata for a remote path
    Stat {
        /// Remote path
        path: String,
    },

    /// Evaluate Lua on the device (reads lines from stdin if no code is given)
    Repl {
        /// Lua code to evaluate once
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        code: Vec<String>,
    },

    /// Check the device responds
    Ping,

    /// Save the display as a PPM image
    Sshot {
        /// Output file
        file: PathBuf,
    },

    /// Interactive shell
    Shell,
}

/// Run one command.
pub fn dispatch<T: Transport>(
    session: &mut Session<T>,
    command: Commands,
    ctx: &Context,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Cat { files } => cat::run(session, &files, out),
        Commands::Cd { dir } => nav::cd(session, &dir),
        Commands::Pwd => nav::pwd(session, out),
        Commands::Cp { src, dst } => cp::run(session, &src, &dst, out),
        Commands::Edit { file } => edit::run(session, &file, ctx.editor.as_deref(), out),
        Commands::Ls { path } => ls::run(session, path.as_deref(), out),
        Commands::Mkdir { dir } => files::mkdir(session, &dir),
        Commands::Rm { paths } => files::rm(session, &paths, out),
        Commands::Rsync { src, dst } => rsync::run(session, &src, &dst, &ctx.interrupt, out),
        Commands::Stat { path } => files::stat(session, &path, out),
        Commands::Repl { code } => repl::run(session, &code, input, out),
        Commands::Ping => device::ping(session, out),
        Commands::Sshot { file } => device::sshot(session, &file, out),
        Commands::Shell => shell::run(session, ctx, input, out),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use load81r_client::{MockTransport, Session, SessionConfig};

    /// A session past the handshake, with the sent log cleared.
    pub fn session() -> (Session<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        transport.queue_line("+OK load81r/1.0");
        transport.queue_line("+OK /");
        let session =
            Session::connect(SessionConfig::new("picocalc", 1900), transport.clone()).unwrap();
        transport.clear_sent();
        (session, transport)
    }

    /// Captured stdout as text.
    pub fn text(out: &[u8]) -> String {
        String::from_utf8_lossy(out).into_owned()
    }
}
