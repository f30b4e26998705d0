//! Command line encoding.
//!
//! Wire form: `VERB[ arg]*\n`, arguments joined by a single space. The
//! protocol has no quoting or escaping, so arguments are validated here
//! and a bad one is refused before anything reaches the socket.

use crate::verb::{Arity, Verb};
use crate::ProtocolError;

/// A verb plus its ordered argument tokens, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    args: Vec<String>,
}

impl Command {
    /// Build a command, checking argument count and token contents.
    pub fn new<I, S>(verb: Verb, args: I) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let spec = verb.spec();

        let count_ok = match spec.arity {
            Arity::None => args.is_empty(),
            Arity::Optional => args.len() <= 1,
            Arity::One | Arity::Trailing => args.len() == 1,
            Arity::Two => args.len() == 2,
        };
        if !count_ok {
            return Err(invalid(
                verb,
                format!("expected {:?} arguments, got {}", spec.arity, args.len()),
            ));
        }

        for arg in &args {
            if arg.is_empty() {
                return Err(invalid(verb, "empty argument".into()));
            }
            if arg.contains(['\n', '\r']) {
                return Err(invalid(verb, "argument contains a line terminator".into()));
            }
            if spec.arity != Arity::Trailing && arg.chars().any(char::is_whitespace) {
                return Err(invalid(verb, format!("argument {arg:?} contains whitespace")));
            }
        }

        Ok(Self { verb, args })
    }

    /// A command that takes no arguments.
    pub fn bare(verb: Verb) -> Result<Self, ProtocolError> {
        Self::new(verb, std::iter::empty::<String>())
    }

    /// The verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Encode as a newline-terminated wire line.
    pub fn to_line(&self) -> String {
        let mut line = String::from(self.verb.name());
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line.push('\n');
        line
    }

    /// Encode as wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_line().into_bytes()
    }
}

fn invalid(verb: Verb, reason: String) -> ProtocolError {
    ProtocolError::InvalidArgument {
        verb: verb.name(),
        reason,
    }
}
