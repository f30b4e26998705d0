//! Device checks: liveness and screen capture.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use load81r_client::{Session, Transport};
use load81r_types::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Send `PING` and report the round-trip time.
pub fn ping<T: Transport>(session: &mut Session<T>, out: &mut dyn Write) -> Result<()> {
    let start = Instant::now();
    session.ping()?;
    writeln!(
        out,
        "pong from {} in {} ms",
        session.config().endpoint,
        start.elapsed().as_millis()
    )?;
    Ok(())
}

/// Capture the display and save it as a binary PPM.
pub fn sshot<T: Transport>(
    session: &mut Session<T>,
    file: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let shot = session.screenshot().context("Screenshot failed")?;
    fs::write(file, shot.to_ppm())
        .with_context(|| format!("Cannot write '{}'", file.display()))?;
    writeln!(
        out,
        "Saved {}x{} screenshot to {}",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        file.display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{session, text};
    use load81r_types::FRAMEBUFFER_LEN;
    use tempfile::tempdir;

    #[test]
    fn ping_reports_endpoint() {
        let (mut session, transport) = session();
        transport.queue_line("+OK pong");

        let mut out = Vec::new();
        ping(&mut session, &mut out).unwrap();
        assert!(text(&out).starts_with("pong from picocalc:1900 in "));
    }

    #[test]
    fn sshot_writes_ppm() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("screen.ppm");
        let (mut session, transport) = session();
        transport.queue_data(&vec![0u8; FRAMEBUFFER_LEN]);

        let mut out = Vec::new();
        sshot(&mut session, &file, &mut out).unwrap();

        let ppm = fs::read(&file).unwrap();
        assert!(ppm.starts_with(b"P6\n320 320\n255\n"));
        assert_eq!(ppm.len(), 15 + SCREEN_WIDTH * SCREEN_HEIGHT * 3);
    }

    #[test]
    fn sshot_rejects_short_frame() {
        let dir = tempdir().unwrap();
        let (mut session, transport) = session();
        transport.queue_data(&[0u8; 10]);

        let mut out = Vec::new();
        assert!(sshot(&mut session, &dir.path().join("s.ppm"), &mut out).is_err());
        assert!(!dir.path().join("s.ppm").exists());
        assert!(session.is_connected());
    }
}
