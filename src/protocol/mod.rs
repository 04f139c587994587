//! Protocol Module
//!
//! Defines the wire protocol for client-server communication, a text
//! dialect of RESP.
//!
//! ## Request Flow
//! ```text
//!  bytes ──► codec::read_request ──► tokens
//!  tokens ──► CommandCall::from_tokens ──► CommandCall
//!  CommandCall ──► validator::validate ──► Command
//!  Command ──► Engine ──► Reply ──► codec::write_reply ──► bytes
//! ```
//!
//! ### Commands
//! - `PING [message]`
//! - `ECHO message`
//! - `GET key`
//! - `SET key value [NX|XX] [GET] [EX s|PX ms|EXAT s|PXAT ms|KEEPTTL]`
//!
//! Command and option names are case-insensitive.

mod command;
mod response;
mod codec;
mod validator;

pub use command::{
    Argument, Command, CommandCall, CommandKind, SetCondition, SetOptions, TtlOption,
    VALUE_OPTIONS,
};
pub use response::Reply;
pub use codec::{
    decode_request, read_request, encode_request, write_request,
    encode_reply, encode_reply_into, write_reply, read_reply,
    CRLF, MAX_ARRAY_LEN, MAX_BULK_LEN,
};
pub use validator::validate;
