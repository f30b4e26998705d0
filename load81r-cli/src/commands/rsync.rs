//! Mirror a directory tree to or from the device.

use anyhow::{bail, Result};
use std::io::Write;
use std::path::Path;

use load81r_client::{Direction, Session, SyncEngine, Transport};

use super::cp::remote_path;
use crate::interrupt::Interrupt;

/// Which side is remote, decided from the arguments alone.
#[derive(Debug, PartialEq, Eq)]
pub enum Transfer<'a> {
    /// Remote source, local destination.
    Download {
        /// Remote tree.
        remote: &'a str,
        /// Local directory.
        local: &'a Path,
    },
    /// Local source, remote destination.
    Upload {
        /// Local file or tree.
        local: &'a Path,
        /// Remote path.
        remote: &'a str,
    },
}

/// Pick the remote side: the one with a `remote:` prefix, or failing
/// that, the one that is an absolute path.
pub fn plan<'a>(src: &'a str, dst: &'a str) -> Result<Transfer<'a>> {
    let remote_is_src = match (remote_path(src), remote_path(dst)) {
        (Some(_), Some(_)) => bail!("Both paths are remote (server-side copy is not supported)"),
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => match (src.starts_with('/'), dst.starts_with('/')) {
            (true, true) => {
                bail!("Both paths are absolute; prefix the remote one with 'remote:'")
            }
            (false, false) => {
                bail!("Both paths are local; the remote path must be absolute or start with 'remote:'")
            }
            (src_is_absolute, _) => src_is_absolute,
        },
    };

    let strip = |arg: &'a str| remote_path(arg).unwrap_or(arg);
    Ok(if remote_is_src {
        Transfer::Download {
            remote: strip(src),
            local: Path::new(dst),
        }
    } else {
        Transfer::Upload {
            local: Path::new(src),
            remote: strip(dst),
        }
    })
}

/// Run the transfer, printing each copied file.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    src: &str,
    dst: &str,
    interrupt: &Interrupt,
    out: &mut dyn Write,
) -> Result<()> {
    let transfer = plan(src, dst)?;
    match &transfer {
        Transfer::Download { remote, local } => {
            writeln!(out, "Syncing {} -> {}", remote, local.display())?
        }
        Transfer::Upload { local, remote } => {
            writeln!(out, "Syncing {} -> {}", local.display(), remote)?
        }
    }

    let report = {
        let _armed = interrupt.arm();
        let mut engine = SyncEngine::new(session)
            .with_cancel(interrupt.flag())
            .on_progress(|path, _| {
                let _ = writeln!(out, "  {path}");
            });
        match transfer {
            Transfer::Download { remote, local } => engine.download(remote, local),
            Transfer::Upload { local, remote } => engine.upload(local, remote),
        }
    };

    let verb = match report.direction {
        Direction::Download => "Downloaded",
        Direction::Upload => "Uploaded",
    };
    writeln!(out, "{} {} files ({} bytes)", verb, report.files, report.bytes)?;
    report.into_result()?;
    Ok(())
}
