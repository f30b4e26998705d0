//! Interactive shell.
//!
//! Each line is parsed with the same subcommand grammar as the command
//! line, so `ls /load81` in the shell behaves like `load81r HOST ls /load81`.
//! A failed command is reported and the prompt returns; the shell only
//! exits on `exit`, `quit`, end of input or a lost connection.

use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};

use load81r_client::{Session, Transport};

use super::{dispatch, Commands, Context};

#[derive(Parser, Debug)]
#[command(name = "load81r", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// Run the prompt loop until the user leaves.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    ctx: &Context,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "Connected to {}", session.config().endpoint)?;
    writeln!(out, "Type 'help' for available commands, 'exit' to leave")?;

    loop {
        write!(out, "load81r:{}> ", session.cwd())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(());
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first() {
            None => continue,
            Some(&"exit") | Some(&"quit") => return Ok(()),
            Some(_) => {}
        }

        let command = match ShellLine::try_parse_from(tokens.iter().copied()) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{e}")?;
                continue;
            }
        };
        if matches!(command, Commands::Shell) {
            writeln!(out, "Already in the shell")?;
            continue;
        }

        if let Err(e) = dispatch(session, command, ctx, input, out) {
            eprintln!("Error: {e:#}");
            if !session.is_connected() {
                return Err(e.context("Connection lost"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{session, text};
    use crate::interrupt::Interrupt;
    use std::io::Cursor;

    fn ctx() -> Context {
        Context {
            editor: None,
            interrupt: Interrupt::default(),
        }
    }

    #[test]
    fn runs_commands_until_exit() {
        let (mut session, transport) = session();
        transport.queue_line("+OK");
        transport.queue_line("+OK /load81");
        transport.queue_data(b"hello\n");

        let mut input = Cursor::new("cd /load81\n\ncat a.txt\nexit\npwd\n");
        let mut out = Vec::new();
        run(&mut session, &ctx(), &mut input, &mut out).unwrap();

        assert_eq!(transport.sent_text(), "CD /load81\nPWD\nCAT a.txt\n");
        let shown = text(&out);
        assert!(shown.contains("load81r:/> "));
        assert!(shown.contains("load81r:/load81> hello\n"));
    }

    #[test]
    fn refused_command_keeps_prompt() {
        let (mut session, transport) = session();
        transport.queue_line("-ERR File not found");
        transport.queue_line("+OK pong");

        let mut input = Cursor::new("cat nope\nping\n");
        let mut out = Vec::new();
        run(&mut session, &ctx(), &mut input, &mut out).unwrap();

        assert_eq!(transport.sent_text(), "CAT nope\nPING\n");
        assert!(text(&out).contains("pong from"));
    }

    #[test]
    fn unknown_command_is_reported_locally() {
        let (mut session, transport) = session();

        let mut input = Cursor::new("frobnicate\nshell\n");
        let mut out = Vec::new();
        run(&mut session, &ctx(), &mut input, &mut out).unwrap();

        assert!(transport.sent_messages().is_empty());
        assert!(text(&out).contains("Already in the shell"));
    }

    #[test]
    fn lost_connection_ends_shell() {
        let (mut session, transport) = session();
        transport.queue_line("GARBAGE");

        let mut input = Cursor::new("ping\nping\n");
        let mut out = Vec::new();
        assert!(run(&mut session, &ctx(), &mut input, &mut out).is_err());
        assert_eq!(transport.sent_text(), "PING\n");
    }
}
