//! Protocol verbs and their framing rules.
//!
//! Every verb the device understands is listed once in [`Verb::spec`], which
//! says how many arguments it takes and what kind of response it produces.
//! Adding a verb without a table entry is a compile error.

use std::fmt;

use crate::Response;

/// A command verb understood by the device's file server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Handshake, carries the client version.
    Hello,
    /// Print the session's working directory.
    Pwd,
    /// Change the working directory.
    Cd,
    /// List a directory.
    Ls,
    /// Read a file.
    Cat,
    /// Write a file (two-stage upload).
    Put,
    /// Create a directory.
    Mkdir,
    /// Remove a file or empty directory.
    Rm,
    /// Metadata for one path.
    Stat,
    /// Evaluate Lua code on the device.
    Repl,
    /// Dump the framebuffer.
    Sshot,
    /// Liveness check.
    Ping,
    /// End the session.
    Quit,
}

/// How many argument tokens a verb accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No arguments.
    None,
    /// Zero or one token.
    Optional,
    /// Exactly one token.
    One,
    /// Exactly two tokens.
    Two,
    /// One free-text argument running to the end of the line.
    Trailing,
}

/// The response shape a verb produces on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// `+OK` with optional inline text.
    Text,
    /// `+DATA <n>` followed by a payload and `+END`.
    Binary,
    /// `+READY`, after which the caller streams raw bytes and reads one
    /// [`Ack`](Reply::Ack) confirming the write.
    Ready,
    /// Bare `+OK`; any inline text is ignored.
    Ack,
}

impl Reply {
    /// Whether a successful response has this shape. `-ERR` never does.
    pub fn accepts(self, response: &Response) -> bool {
        matches!(
            (self, response),
            (Reply::Text | Reply::Ack, Response::Ok(_))
                | (Reply::Binary, Response::Binary(_))
                | (Reply::Ready, Response::Ready)
        )
    }

    /// The [`Response::kind`] this shape accepts.
    pub const fn kind(self) -> &'static str {
        match self {
            Reply::Text | Reply::Ack => "ok",
            Reply::Binary => "binary",
            Reply::Ready => "ready",
        }
    }
}

/// Static framing rules for one verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbSpec {
    /// Name as written on the wire.
    pub name: &'static str,
    /// Accepted argument count.
    pub arity: Arity,
    /// Success response shape.
    pub reply: Reply,
}

impl Verb {
    /// All verbs, in wire-table order.
    pub const ALL: [Verb; 13] = [
        Verb::Hello,
        Verb::Pwd,
        Verb::Cd,
        Verb::Ls,
        Verb::Cat,
        Verb::Put,
        Verb::Mkdir,
        Verb::Rm,
        Verb::Stat,
        Verb::Repl,
        Verb::Sshot,
        Verb::Ping,
        Verb::Quit,
    ];

    /// Framing rules for this verb.
    pub const fn spec(self) -> VerbSpec {
        const fn s(name: &'static str, arity: Arity, reply: Reply) -> VerbSpec {
            VerbSpec { name, arity, reply }
        }
        match self {
            Verb::Hello => s("HELLO", Arity::One, Reply::Text),
            Verb::Pwd => s("PWD", Arity::None, Reply::Text),
            Verb::Cd => s("CD", Arity::One, Reply::Ack),
            Verb::Ls => s("LS", Arity::Optional, Reply::Binary),
            Verb::Cat => s("CAT", Arity::One, Reply::Binary),
            Verb::Put => s("PUT", Arity::Two, Reply::Ready),
            Verb::Mkdir => s("MKDIR", Arity::One, Reply::Ack),
            Verb::Rm => s("RM", Arity::One, Reply::Ack),
            Verb::Stat => s("STAT", Arity::One, Reply::Text),
            Verb::Repl => s("REPL", Arity::Trailing, Reply::Text),
            Verb::Sshot => s("SSHOT", Arity::None, Reply::Binary),
            Verb::Ping => s("PING", Arity::None, Reply::Ack),
            Verb::Quit => s("QUIT", Arity::None, Reply::Ack),
        }
    }

    /// Name as written on the wire.
    pub const fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_upper_case_tokens() {
        let mut names: Vec<_> = Verb::ALL.iter().map(|v| v.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Verb::ALL.len());
        assert!(names
            .iter()
            .all(|n| n.chars().all(|c| c.is_ascii_uppercase())));
    }

    #[test]
    fn every_reply_accepts_exactly_its_own_kind() {
        let responses = [
            Response::Ok(Some("x".into())),
            Response::Binary(vec![1]),
            Response::Ready,
            Response::Error("no".into()),
        ];
        for verb in Verb::ALL {
            let reply = verb.spec().reply;
            let accepted: Vec<_> = responses
                .iter()
                .filter(|r| reply.accepts(r))
                .map(Response::kind)
                .collect();
            assert_eq!(accepted, vec![reply.kind()], "{verb}");
        }
    }

    #[test]
    fn transfer_verbs_have_expected_replies() {
        assert_eq!(Verb::Cat.spec().reply, Reply::Binary);
        assert_eq!(Verb::Ls.spec().reply, Reply::Binary);
        assert_eq!(Verb::Put.spec().reply, Reply::Ready);
        assert_eq!(Verb::Repl.spec().arity, Arity::Trailing);
    }
}
