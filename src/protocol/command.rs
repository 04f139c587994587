//! Command definitions
//!
//! Two shapes live here:
//! - [`CommandCall`]: the untyped call built straight from the decoded
//!   tokens (command kind + grouped arguments).
//! - [`Command`]: the typed command produced by the validator and consumed
//!   by the engine.

use std::fmt;

use crate::error::CommandError;

/// Option names that consume the following token as their value
pub const VALUE_OPTIONS: [&str; 4] = ["EX", "PX", "EXAT", "PXAT"];

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Ping,
    Echo,
    Get,
    Set,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::Ping,
        CommandKind::Echo,
        CommandKind::Get,
        CommandKind::Set,
    ];

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Ping => "PING",
            CommandKind::Echo => "ECHO",
            CommandKind::Get => "GET",
            CommandKind::Set => "SET",
        }
    }

    /// Match a token against the known commands, ignoring case
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single argument as written by the client
///
/// `value` is only populated for options listed in [`VALUE_OPTIONS`], and
/// may still be `None` when the request ended right after the option name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub value: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Case-insensitive comparison of the argument name
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn takes_value(token: &str) -> bool {
        VALUE_OPTIONS.iter().any(|opt| opt.eq_ignore_ascii_case(token))
    }
}

/// An untyped command call: which command, and its arguments in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall {
    pub kind: CommandKind,
    pub arguments: Vec<Argument>,
}

impl CommandCall {
    pub fn new(kind: CommandKind, arguments: Vec<Argument>) -> Self {
        Self { kind, arguments }
    }

    /// Build a call from the raw tokens of one request
    ///
    /// The first token names the command. Each remaining token becomes one
    /// argument, except that `EX`/`PX`/`EXAT`/`PXAT` swallow the token after
    /// them as their value.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self, CommandError> {
        let mut tokens = tokens.into_iter();
        let name = tokens.next().ok_or(CommandError::InvalidRespFormat)?;
        let kind =
            CommandKind::from_token(&name).ok_or(CommandError::UnknownCommand(name))?;

        let mut arguments = Vec::new();
        while let Some(token) = tokens.next() {
            if Argument::takes_value(&token) {
                arguments.push(Argument {
                    name: token,
                    value: tokens.next(),
                });
            } else {
                arguments.push(Argument::new(token));
            }
        }

        Ok(Self { kind, arguments })
    }
}

/// NX / XX
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    /// NX: only set when the key does not exist
    IfAbsent,
    /// XX: only set when the key already exists
    IfPresent,
}

/// Expiry option of SET; numbers are exactly as the client sent them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlOption {
    /// EX seconds
    Ex(u64),
    /// PX milliseconds
    Px(u64),
    /// EXAT unix-time-seconds
    ExAt(u64),
    /// PXAT unix-time-milliseconds
    PxAt(u64),
    /// KEEPTTL
    KeepTtl,
}

/// Modifiers accepted by SET
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub condition: Option<SetCondition>,
    pub get: bool,
    pub ttl: Option<TtlOption>,
}

/// A validated command, ready for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ping, optionally echoing a message
    Ping { message: Option<String> },

    /// Echo a message back
    Echo { message: String },

    /// Get a value by key
    Get { key: String },

    /// Set a key, with optional conditions and expiry
    Set {
        key: String,
        value: String,
        options: SetOptions,
    },
}

impl Command {
    /// Get the command kind
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Ping { .. } => CommandKind::Ping,
            Command::Echo { .. } => CommandKind::Echo,
            Command::Get { .. } => CommandKind::Get,
            Command::Set { .. } => CommandKind::Set,
        }
    }
}
