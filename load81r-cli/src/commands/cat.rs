//! Print remote files.

use anyhow::{bail, Context, Result};
use std::io::Write;

use load81r_client::{Session, Transport};

/// Write each file's bytes to `out`, in order.
///
/// A file the device refuses is reported and skipped; the command still
/// fails at the end.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    files: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let mut failed = 0;
    for file in files {
        match session.cat(file) {
            Ok(data) => out.write_all(&data)?,
            Err(e) if !e.is_fatal() => {
                eprintln!("Error: cannot read '{file}': {e}");
                failed += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Cannot read '{file}'")),
        }
    }
    out.flush()?;

    if failed > 0 {
        bail!("{} of {} files could not be read", failed, files.len());
    }
    Ok(())
}
