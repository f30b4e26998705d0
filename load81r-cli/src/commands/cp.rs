//! Copy a single file to or from the device.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use load81r_client::{Session, Transport};

/// Prefix that marks the remote side of `cp` and `rsync`.
pub const REMOTE_PREFIX: &str = "remote:";

/// Strip the `remote:` prefix, if present.
pub fn remote_path(arg: &str) -> Option<&str> {
    arg.strip_prefix(REMOTE_PREFIX)
}

/// Copy `src` to `dst`. Exactly one side must carry the `remote:` prefix.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    src: &str,
    dst: &str,
    out: &mut dyn Write,
) -> Result<()> {
    match (remote_path(src), remote_path(dst)) {
        (Some(_), Some(_)) => bail!("Server-side copy is not supported"),
        (None, None) => bail!("One side must be prefixed with '{REMOTE_PREFIX}'"),
        (Some(remote), None) => download(session, remote, Path::new(dst), out),
        (None, Some(remote)) => upload(session, Path::new(src), remote, out),
    }
}

fn download<T: Transport>(
    session: &mut Session<T>,
    remote: &str,
    local: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let target = if local.is_dir() {
        local.join(basename(remote))
    } else {
        local.to_path_buf()
    };

    writeln!(out, "Downloading {} -> {}", remote, target.display())?;
    let data = session
        .cat(remote)
        .with_context(|| format!("Cannot read remote file '{remote}'"))?;
    fs::write(&target, &data)
        .with_context(|| format!("Cannot write local file '{}'", target.display()))?;
    writeln!(out, "Downloaded {} bytes", data.len())?;
    Ok(())
}

fn upload<T: Transport>(
    session: &mut Session<T>,
    local: &Path,
    remote: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let data =
        fs::read(local).with_context(|| format!("Cannot read local file '{}'", local.display()))?;

    let target = if remote.ends_with('/') {
        let name = local
            .file_name()
            .and_then(|name| name.to_str())
            .context("Local file name is not valid UTF-8")?;
        format!("{remote}{name}")
    } else {
        remote.to_string()
    };

    writeln!(out, "Uploading {} -> {}", local.display(), target)?;
    session
        .put(&target, &data)
        .with_context(|| format!("Cannot write remote file '{target}'"))?;
    writeln!(out, "Uploaded {} bytes", data.len())?;
    Ok(())
}

fn basename(remote: &str) -> PathBuf {
    PathBuf::from(remote.rsplit('/').next().unwrap_or(remote))
}
