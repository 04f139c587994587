//! Reply definitions
//!
//! Represents replies sent back to clients.

use crate::error::CommandError;

/// A reply to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+text`
    Simple(String),

    /// `$len` + text, or `$-1` when `None`
    Bulk(Option<String>),

    /// `_`
    Null,

    /// `-ERR message`
    Error(String),
}

impl Reply {
    /// Create a simple string reply
    pub fn simple(text: impl Into<String>) -> Self {
        Reply::Simple(text.into())
    }

    /// Create a bulk string reply
    pub fn bulk(text: impl Into<String>) -> Self {
        Reply::Bulk(Some(text.into()))
    }

    /// Create a null bulk string reply (`$-1`)
    pub fn null_bulk() -> Self {
        Reply::Bulk(None)
    }

    /// Create a null reply (`_`)
    pub fn null() -> Self {
        Reply::Null
    }

    /// Create an error reply; `message` is written after the `ERR ` prefix
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// `+OK`
    pub fn ok() -> Self {
        Reply::simple("OK")
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err.to_string())
    }
}
