//! Working directory commands.

use anyhow::{Context, Result};
use std::io::Write;

use load81r_client::{Session, Transport};

/// Change the remote working directory.
pub fn cd<T: Transport>(session: &mut Session<T>, dir: &str) -> Result<()> {
    session
        .cd(dir)
        .with_context(|| format!("Cannot change to directory '{dir}'"))?;
    Ok(())
}

/// Print the remote working directory.
pub fn pwd<T: Transport>(session: &mut Session<T>, out: &mut dyn Write) -> Result<()> {
    let cwd = session.pwd()?;
    writeln!(out, "{cwd}")?;
    Ok(())
}
