//! List a remote directory.

use anyhow::{Context, Result};
use std::io::Write;

use load81r_client::{Session, Transport};
use load81r_types::DirEntry;

/// Print one line per entry, in the order the device sent them.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    path: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let entries = session
        .ls(path)
        .with_context(|| format!("Cannot list '{}'", path.unwrap_or(".")))?;
    for entry in &entries {
        writeln!(out, "{}", format_entry(entry))?;
    }
    Ok(())
}

fn format_entry(entry: &DirEntry) -> String {
    if entry.is_dir {
        format!("drwxr-xr-x  {}/", entry.name)
    } else {
        format!("-rw-r--r--  {:>6}  {}", format_size(entry.size), entry.name)
    }
}

/// Human-readable size: bytes below 1K, then one decimal of K or M.
pub fn format_size(size: u64) -> String {
    const K: u64 = 1024;
    if size < K {
        format!("{size}B")
    } else if size < K * K {
        format!("{:.1}K", size as f64 / K as f64)
    } else {
        format!("{:.1}M", size as f64 / (K * K) as f64)
    }
}
