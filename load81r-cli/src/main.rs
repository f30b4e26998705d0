//! # load81r
//!
//! Remote shell and file transfer tool for the PicoCalc.
//!
//! ## Commands
//!
//! - `ls`, `cat`, `stat`, `cd`, `pwd`: browse the device
//! - `cp`, `rsync`: copy files and trees in either direction
//! - `edit`: edit a remote file with a local editor
//! - `repl`: evaluate Lua on the device
//! - `sshot`: save the display as a PPM image
//! - `shell`: interactive prompt (the default)
//!
//! ## Example
//!
//! ```bash
//! # List the LOAD81 directory
//! load81r 192.168.1.100 ls /load81
//!
//! # Upload a file
//! load81r 192.168.1.100 cp game.lua remote:/load81/game.lua
//!
//! # Back up the device
//! load81r 192.168.1.100 rsync /load81 ./backup
//!
//! # Interactive shell
//! load81r 192.168.1.100
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use load81r_client::{Session, SyncError, TcpTransport};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod interrupt;

use commands::Commands;
use config::Config;
use interrupt::{Interrupt, EXIT_INTERRUPTED};

/// Remote shell and file transfer tool for the PicoCalc.
#[derive(Parser, Debug)]
#[command(name = "load81r")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Device hostname or IP address
    host: String,

    /// Device port (default: 1900)
    #[arg(long, short)]
    port: Option<u16>,

    /// Connect and I/O timeout in seconds (default: 30)
    #[arg(long, short)]
    timeout: Option<u64>,

    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log protocol traffic to stderr
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupted(&e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let session_config = config.session(&cli.host, cli.port, cli.timeout);

    let interrupt = Interrupt::default();
    interrupt
        .install()
        .context("Failed to install Ctrl-C handler")?;

    let ctx = commands::Context {
        editor: config.editor.command.clone(),
        interrupt,
    };

    let endpoint = session_config.endpoint.clone();
    let mut session = Session::connect(session_config, TcpTransport::new())
        .with_context(|| format!("Cannot connect to {endpoint}"))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = cli.command.unwrap_or(Commands::Shell);
    commands::dispatch(&mut session, command, &ctx, &mut input, &mut out)
}

/// Log to stderr so stdout stays clean for `cat`.
///
/// `LOAD81R_LOG` takes an `EnvFilter` directive; `-v` forces `debug`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("LOAD81R_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn is_interrupted(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::Interrupted { .. })
    )
}
