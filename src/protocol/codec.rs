//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Every line ends with CR LF. A bare LF is tolerated on input.
//!
//! ### Request Format
//! ```text
//! *<N>
//! $<len>
//! <token>
//! ... (N times)
//! ```
//! Blank lines between elements are skipped and do not count.
//!
//! ### Reply Format
//! ```text
//! simple string : +<text>
//! bulk string   : $<len> <text>   (absent: $-1)
//! null          : _
//! error         : -ERR <message>
//! ```

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::BytesMut;

use crate::error::{CommandError, EmberError, Result};
use super::Reply;

/// Line terminator
pub const CRLF: &str = "\r\n";

/// Prefix written in front of every error message
pub const ERROR_PREFIX: &str = "ERR ";

/// Maximum number of elements in one request array
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Maximum declared length of one bulk string (512 MB)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Longest header or length line accepted, terminator included
const MAX_CONTROL_LINE: usize = 64 * 1024;

/// Elements reserved up front, however large the declared array
const PREALLOC_ELEMENTS: usize = 16;

const ARRAY_BYTE: u8 = b'*';
const BULK_BYTE: u8 = b'$';
const SIMPLE_BYTE: u8 = b'+';
const ERROR_BYTE: u8 = b'-';
const NULL_BYTE: u8 = b'_';

// =============================================================================
// Line reading
// =============================================================================

/// One line read under a length cap
enum Line {
    Complete(String),
    /// Ran past the cap; the rest of the line has been discarded
    TooLong,
}

/// Read one line without its terminator
///
/// At most `limit` bytes, terminator included, are buffered. Returns `None`
/// at a clean end of stream.
fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Option<Line>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(limit as u64)
        .read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if read == limit {
        discard_line(reader)?;
        return Ok(Some(Line::TooLong));
    }

    String::from_utf8(buf)
        .map(|line| Some(Line::Complete(line)))
        .map_err(|_| CommandError::InvalidRespFormat.into())
}

/// Skip the remainder of the current line without buffering it
fn discard_line<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        let (found, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Read one line, treating end of stream as a transport failure
fn expect_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Line> {
    read_line(reader, limit)?.ok_or_else(|| {
        EmberError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "stream ended in the middle of a request",
        ))
    })
}

/// Read the next line that is not blank
fn expect_non_blank_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Line> {
    loop {
        match expect_line(reader, limit)? {
            Line::Complete(line) if line.is_empty() => continue,
            line => return Ok(line),
        }
    }
}

/// A header or length line, which never legitimately reaches the cap
fn expect_control_line<R: BufRead>(reader: &mut R) -> Result<String> {
    match expect_non_blank_line(reader, MAX_CONTROL_LINE)? {
        Line::Complete(line) => Ok(line),
        Line::TooLong => Err(CommandError::InvalidRespFormat.into()),
    }
}

/// Parse `<prefix><integer>`
fn parse_prefixed(line: &str, prefix: u8) -> std::result::Result<i64, CommandError> {
    match line.as_bytes().first() {
        Some(&first) if first == prefix => {}
        _ => return Err(CommandError::Syntax),
    }
    line[1..].parse().map_err(|_| CommandError::Syntax)
}

// =============================================================================
// Request Decoding
// =============================================================================

/// Decode one request, given its header line
///
/// An empty header means there is no request this round and yields
/// `Ok(None)`. Otherwise the elements are pulled from `reader` and returned
/// as raw tokens, command name first.
pub fn decode_request<R: BufRead>(header: &str, reader: &mut R) -> Result<Option<Vec<String>>> {
    if header.is_empty() {
        return Ok(None);
    }

    let size = parse_prefixed(header, ARRAY_BYTE)?;
    if size <= 0 || size > MAX_ARRAY_LEN {
        return Err(CommandError::InvalidRespFormat.into());
    }

    let size = size as usize;
    let mut tokens = Vec::with_capacity(size.min(PREALLOC_ELEMENTS));
    while tokens.len() < size {
        let element = expect_control_line(reader)?;
        let declared = parse_prefixed(&element, BULK_BYTE)?;
        if !(0..=MAX_BULK_LEN).contains(&declared) {
            return Err(CommandError::InvalidRespFormat.into());
        }

        // A payload longer than declared is cut off at the cap
        match expect_non_blank_line(reader, declared as usize + CRLF.len())? {
            Line::Complete(payload) if payload.len() as i64 == declared => tokens.push(payload),
            _ => return Err(CommandError::Syntax.into()),
        }
    }

    Ok(Some(tokens))
}

/// Read the next request from a stream
///
/// Blank header lines are skipped. Returns `Ok(None)` once the stream ends
/// cleanly between requests.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Vec<String>>> {
    while let Some(header) = read_line(reader, MAX_CONTROL_LINE)? {
        let header = match header {
            Line::Complete(header) => header,
            Line::TooLong => return Err(CommandError::InvalidRespFormat.into()),
        };
        if let Some(tokens) = decode_request(&header, reader)? {
            return Ok(Some(tokens));
        }
    }
    Ok(None)
}

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode tokens as a request array
pub fn encode_request<S: AsRef<str>>(tokens: &[S]) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[ARRAY_BYTE]);
    buf.extend_from_slice(tokens.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF.as_bytes());
    for token in tokens {
        let token = token.as_ref();
        buf.extend_from_slice(&[BULK_BYTE]);
        buf.extend_from_slice(token.len().to_string().as_bytes());
        buf.extend_from_slice(CRLF.as_bytes());
        buf.extend_from_slice(token.as_bytes());
        buf.extend_from_slice(CRLF.as_bytes());
    }
    buf
}

/// Write a request to a stream
pub fn write_request<W: Write, S: AsRef<str>>(writer: &mut W, tokens: &[S]) -> Result<()> {
    writer.write_all(&encode_request(tokens))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(reply: &Reply) -> BytesMut {
    let mut buf = BytesMut::new();
    encode_reply_into(reply, &mut buf);
    buf
}

/// Encode a reply into an existing buffer
pub fn encode_reply_into(reply: &Reply, buf: &mut BytesMut) {
    match reply {
        Reply::Simple(text) => {
            buf.extend_from_slice(&[SIMPLE_BYTE]);
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(CRLF.as_bytes());
        }
        Reply::Bulk(None) => {
            buf.extend_from_slice(b"$-1");
            buf.extend_from_slice(CRLF.as_bytes());
        }
        Reply::Bulk(Some(text)) => {
            buf.extend_from_slice(&[BULK_BYTE]);
            buf.extend_from_slice(text.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF.as_bytes());
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(CRLF.as_bytes());
        }
        Reply::Null => {
            buf.extend_from_slice(&[NULL_BYTE]);
            buf.extend_from_slice(CRLF.as_bytes());
        }
        Reply::Error(message) => {
            buf.extend_from_slice(&[ERROR_BYTE]);
            buf.extend_from_slice(ERROR_PREFIX.as_bytes());
            buf.extend_from_slice(message.as_bytes());
            // Some messages arrive already terminated
            if !message.ends_with(CRLF) {
                buf.extend_from_slice(CRLF.as_bytes());
            }
        }
    }
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    writer.write_all(&encode_reply(reply))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete reply from a stream
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = match expect_line(reader, MAX_CONTROL_LINE)? {
        Line::Complete(line) => line,
        Line::TooLong => return Err(EmberError::Protocol("reply line too long".to_string())),
    };
    let first = match line.as_bytes().first() {
        Some(&first) if first.is_ascii() => first,
        _ => return Err(EmberError::Protocol(format!("unexpected reply line: {line}"))),
    };
    let rest = &line[1..];

    match first {
        SIMPLE_BYTE => Ok(Reply::Simple(rest.to_string())),
        ERROR_BYTE => {
            let message = rest.strip_prefix(ERROR_PREFIX).unwrap_or(rest);
            Ok(Reply::Error(message.to_string()))
        }
        NULL_BYTE if rest.is_empty() => Ok(Reply::Null),
        BULK_BYTE => {
            let len: i64 = rest
                .parse()
                .map_err(|_| EmberError::Protocol(format!("invalid bulk length: {rest}")))?;
            if len == -1 {
                return Ok(Reply::Bulk(None));
            }
            if !(0..=MAX_BULK_LEN).contains(&len) {
                return Err(EmberError::Protocol(format!("invalid bulk length: {len}")));
            }
            match expect_line(reader, len as usize + CRLF.len())? {
                Line::Complete(text) if text.len() as i64 == len => Ok(Reply::Bulk(Some(text))),
                _ => Err(EmberError::Protocol(format!(
                    "bulk length mismatch: expected {len}"
                ))),
            }
        }
        _ => Err(EmberError::Protocol(format!("unexpected reply line: {line}"))),
    }
}
