//! Error types for EmberKV
//!
//! Two layers of failure exist:
//! - [`CommandError`]: a single request was malformed or invalid. It is
//!   turned into an `-ERR` reply and the connection keeps going.
//! - [`EmberError`]: everything else (transport, configuration, bad replies
//!   seen by the client). These end the current operation.

use thiserror::Error;

use crate::protocol::CommandKind;

/// Result type alias using EmberError
pub type Result<T> = std::result::Result<T, EmberError>;

/// Unified error type for EmberKV operations
#[derive(Debug, Error)]
pub enum EmberError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Command(#[from] CommandError),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EmberError {
    /// True when the failure only concerns the current request and the
    /// connection can keep serving.
    pub fn is_request_error(&self) -> bool {
        matches!(self, EmberError::Command(_))
    }
}

/// Per-request failures, rendered verbatim after `-ERR ` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(CommandKind),

    #[error("syntax error")]
    Syntax,

    #[error("value is not an integer or out of range")]
    InvalidValueType,

    #[error("invalid RESP serialization format")]
    InvalidRespFormat,
}
