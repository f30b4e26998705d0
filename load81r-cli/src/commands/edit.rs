//! Edit a remote file with a local editor.
//!
//! The file is downloaded to a scratch file, the editor runs on it, and the
//! result is uploaded only if the bytes changed. A file the device does not
//! have starts out empty.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process;

use load81r_client::{ClientError, Session, Transport};

const FALLBACK_EDITOR: &str = "vi";

/// Edit `file` with `$VISUAL`, `$EDITOR`, the configured editor or `vi`.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    file: &str,
    configured: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let editor = pick_editor(
        env::var("VISUAL").ok(),
        env::var("EDITOR").ok(),
        configured,
    );
    edit_with(session, file, &editor, out)
}

fn pick_editor(visual: Option<String>, editor: Option<String>, configured: Option<&str>) -> String {
    [visual, editor, configured.map(str::to_string)]
        .into_iter()
        .flatten()
        .find(|cmd| !cmd.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

fn edit_with<T: Transport>(
    session: &mut Session<T>,
    file: &str,
    editor: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let original = match session.cat(file) {
        Ok(data) => data,
        Err(ClientError::Server(msg)) => {
            tracing::debug!("{} not readable ({}), starting empty", file, msg);
            Vec::new()
        }
        Err(e) => return Err(e).with_context(|| format!("Cannot read '{file}'")),
    };

    let name = file.rsplit('/').next().unwrap_or(file);
    let mut scratch = tempfile::Builder::new()
        .prefix("load81r-")
        .suffix(&format!("-{name}"))
        .tempfile()
        .context("Failed to create scratch file")?;
    scratch.write_all(&original)?;
    scratch.flush()?;

    launch(editor, scratch.path())?;

    let edited = fs::read(scratch.path()).context("Failed to read back edited file")?;
    if edited == original {
        writeln!(out, "File not modified")?;
        return Ok(());
    }

    session
        .put(file, &edited)
        .with_context(|| format!("Cannot upload '{file}'"))?;
    writeln!(out, "Uploaded {} bytes", edited.len())?;
    Ok(())
}

/// Run `editor` (a command line, split on whitespace) on `path` and wait.
fn launch(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().context("Editor command is empty")?;
    let status = process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{program}'"))?;
    if !status.success() {
        bail!("Editor exited with {status}");
    }
    Ok(())
}
