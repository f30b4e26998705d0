//! Directory and metadata commands.

use anyhow::{bail, Context, Result};
use std::io::Write;

use load81r_client::{Session, Transport};

/// Create a remote directory.
pub fn mkdir<T: Transport>(session: &mut Session<T>, dir: &str) -> Result<()> {
    session
        .mkdir(dir)
        .with_context(|| format!("Cannot create directory '{dir}'"))
}

/// Delete each path, reporting refusals and carrying on.
pub fn rm<T: Transport>(
    session: &mut Session<T>,
    paths: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let mut failed = 0;
    for path in paths {
        match session.rm(path) {
            Ok(()) => writeln!(out, "Deleted: {path}")?,
            Err(e) if !e.is_fatal() => {
                eprintln!("Error: cannot delete '{path}': {e}");
                failed += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Cannot delete '{path}'")),
        }
    }
    if failed > 0 {
        bail!("{} of {} paths could not be deleted", failed, paths.len());
    }
    Ok(())
}

/// Print metadata for a path.
pub fn stat<T: Transport>(
    session: &mut Session<T>,
    path: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let stat = session
        .stat(path)
        .with_context(|| format!("Cannot stat '{path}'"))?;
    writeln!(out, "  File: {}", stat.name)?;
    writeln!(out, "  Size: {}", stat.size)?;
    writeln!(
        out,
        "  Type: {}",
        if stat.is_dir { "directory" } else { "regular file" }
    )?;
    Ok(())
}
