//! Evaluate Lua on the device.

use anyhow::Result;
use std::io::{BufRead, Write};

use load81r_client::{Session, Transport};

/// Evaluate `code` once, or read lines from `input` until `.exit`, `.quit`
/// or end of input.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    code: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    if !code.is_empty() {
        if let Some(result) = session.evaluate(&code.join(" "))? {
            writeln!(out, "{result}")?;
        }
        return Ok(());
    }

    writeln!(out, "Lua REPL - type .exit to quit")?;
    loop {
        write!(out, "lua> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        match line.trim() {
            "" => continue,
            ".exit" | ".quit" => break,
            ".help" => {
                writeln!(out, "  .exit, .quit  leave the REPL")?;
                writeln!(out, "  .help         show this help")?;
            }
            code => match session.evaluate(code) {
                Ok(Some(result)) => writeln!(out, "{result}")?,
                Ok(None) => {}
                Err(e) if !e.is_fatal() => eprintln!("Error: {e}"),
                Err(e) => return Err(e.into()),
            },
        }
    }
    Ok(())
}
