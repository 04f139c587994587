//! Codec Tests
//!
//! Tests for request decoding and reply encoding/decoding.

use std::io::{Cursor, ErrorKind};

use emberkv::protocol::{
    decode_request, encode_reply, encode_request, read_reply, read_request, write_reply,
    write_request, Reply,
};
use emberkv::{CommandError, EmberError};

// =============================================================================
// Helper Functions
// =============================================================================

fn read_all(input: &str) -> Result<Option<Vec<String>>, EmberError> {
    let mut cursor = Cursor::new(input.as_bytes().to_vec());
    read_request(&mut cursor)
}

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn command_error(result: Result<Option<Vec<String>>, EmberError>) -> CommandError {
    match result {
        Err(EmberError::Command(e)) => e,
        other => panic!("Expected command error, got {:?}", other),
    }
}

// =============================================================================
// Request Decoding Tests
// =============================================================================

#[test]
fn test_decode_ping() {
    let result = read_all("*1\r\n$4\r\nPING\r\n").unwrap();
    assert_eq!(result, Some(tokens(&["PING"])));
}

#[test]
fn test_decode_set_with_options() {
    let input = "*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nEX\r\n$2\r\n10\r\n";
    let result = read_all(input).unwrap();
    assert_eq!(result, Some(tokens(&["SET", "k", "v", "EX", "10"])));
}

#[test]
fn test_decode_accepts_bare_newlines() {
    let result = read_all("*2\n$4\nECHO\n$2\nhi\n").unwrap();
    assert_eq!(result, Some(tokens(&["ECHO", "hi"])));
}

#[test]
fn test_decode_skips_blank_lines_between_elements() {
    let input = "*2\r\n\r\n$4\r\nECHO\r\n\r\n\r\n$2\r\n\r\nhi\r\n";
    let result = read_all(input).unwrap();
    assert_eq!(result, Some(tokens(&["ECHO", "hi"])));
}

#[test]
fn test_empty_header_is_not_a_request() {
    let mut cursor = Cursor::new(b"*1\r\n$4\r\nPING\r\n".to_vec());
    let result = decode_request("", &mut cursor).unwrap();
    assert_eq!(result, None);

    // Nothing was consumed from the stream
    assert_eq!(cursor.position(), 0);
}

#[test]
fn test_read_request_skips_empty_header_lines() {
    let result = read_all("\r\n\r\n*1\r\n$4\r\nPING\r\n").unwrap();
    assert_eq!(result, Some(tokens(&["PING"])));
}

#[test]
fn test_read_request_returns_none_at_end_of_stream() {
    assert_eq!(read_all("").unwrap(), None);
    assert_eq!(read_all("\r\n\r\n").unwrap(), None);
}

#[test]
fn test_read_consecutive_requests() {
    let input = "*1\r\n$4\r\nPING\r\n*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n";
    let mut cursor = Cursor::new(input.as_bytes().to_vec());

    assert_eq!(read_request(&mut cursor).unwrap(), Some(tokens(&["PING"])));
    assert_eq!(
        read_request(&mut cursor).unwrap(),
        Some(tokens(&["GET", "key"]))
    );
    assert_eq!(read_request(&mut cursor).unwrap(), None);
}

#[test]
fn test_header_without_array_marker_is_syntax_error() {
    let err = command_error(read_all("PING\r\n"));
    assert_eq!(err, CommandError::Syntax);
}

#[test]
fn test_header_with_non_integer_size_is_syntax_error() {
    assert_eq!(command_error(read_all("*x\r\n")), CommandError::Syntax);
    assert_eq!(command_error(read_all("*\r\n")), CommandError::Syntax);
}

#[test]
fn test_element_without_bulk_marker_is_syntax_error() {
    let err = command_error(read_all("*1\r\n+PING\r\n"));
    assert_eq!(err, CommandError::Syntax);
}

#[test]
fn test_element_with_non_integer_length_is_syntax_error() {
    let err = command_error(read_all("*1\r\n$four\r\nPING\r\n"));
    assert_eq!(err, CommandError::Syntax);
}

#[test]
fn test_payload_length_mismatch_is_syntax_error() {
    let err = command_error(read_all("*1\r\n$5\r\nPING\r\n"));
    assert_eq!(err, CommandError::Syntax);
}

#[test]
fn test_payload_length_counts_bytes() {
    // "é" is two bytes in UTF-8
    let result = read_all("*2\r\n$4\r\nECHO\r\n$2\r\né\r\n").unwrap();
    assert_eq!(result, Some(tokens(&["ECHO", "é"])));
}

#[test]
fn test_zero_or_negative_array_size_is_invalid_format() {
    assert_eq!(command_error(read_all("*0\r\n")), CommandError::InvalidRespFormat);
    assert_eq!(command_error(read_all("*-1\r\n")), CommandError::InvalidRespFormat);
}

#[test]
fn test_oversized_array_is_invalid_format() {
    let err = command_error(read_all("*99999999\r\n"));
    assert_eq!(err, CommandError::InvalidRespFormat);
}

#[test]
fn test_negative_bulk_length_is_invalid_format() {
    let err = command_error(read_all("*1\r\n$-1\r\n"));
    assert_eq!(err, CommandError::InvalidRespFormat);
}

#[test]
fn test_invalid_utf8_is_invalid_format() {
    let mut cursor = Cursor::new(b"*1\r\n$2\r\n\xff\xfe\r\n".to_vec());
    let err = command_error(read_request(&mut cursor));
    assert_eq!(err, CommandError::InvalidRespFormat);
}

#[test]
fn test_overlong_payload_is_cut_off_at_declared_length() {
    let mut input = b"*1\r\n$3\r\n".to_vec();
    input.extend(std::iter::repeat(b'x').take(8 * 1024 * 1024));
    input.extend_from_slice(b"\r\n*1\r\n$4\r\nPING\r\n");

    let mut cursor = Cursor::new(input);
    let err = command_error(read_request(&mut cursor));
    assert_eq!(err, CommandError::Syntax);

    // The rest of the long line is skipped, so the next request lines up
    assert_eq!(read_request(&mut cursor).unwrap(), Some(tokens(&["PING"])));
}

#[test]
fn test_payload_one_byte_too_long_is_syntax_error() {
    let err = command_error(read_all("*1\r\n$3\r\nPING\r\n"));
    assert_eq!(err, CommandError::Syntax);
}

#[test]
fn test_overlong_header_line_is_invalid_format() {
    let mut input = b"*".to_vec();
    input.extend(std::iter::repeat(b'1').take(1024 * 1024));
    input.extend_from_slice(b"\r\n");

    let mut cursor = Cursor::new(input);
    let err = command_error(read_request(&mut cursor));
    assert_eq!(err, CommandError::InvalidRespFormat);
}

#[test]
fn test_huge_array_header_with_short_body() {
    // Declared size is within limits but the stream ends early
    let result = read_all("*1048576\r\n$4\r\nPING\r\n");
    match result {
        Err(EmberError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
}

#[test]
fn test_stream_end_mid_array_is_transport_error() {
    let result = read_all("*2\r\n$4\r\nECHO\r\n");
    match result {
        Err(EmberError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
}

#[test]
fn test_request_errors_are_flagged_as_request_errors() {
    let err = read_all("?\r\n").unwrap_err();
    assert!(err.is_request_error());

    let err = read_all("*1\r\n").unwrap_err();
    assert!(!err.is_request_error());
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_request() {
    let encoded = encode_request(&["ECHO", "hi"]);
    assert_eq!(&encoded[..], b"*2\r\n$4\r\nECHO\r\n$2\r\nhi\r\n");
}

#[test]
fn test_write_request_then_read_request() {
    let mut buf = Vec::new();
    write_request(&mut buf, &["SET", "greeting", "hello world"]).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = read_request(&mut cursor).unwrap();
    assert_eq!(decoded, Some(tokens(&["SET", "greeting", "hello world"])));
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_encode_simple_string() {
    assert_eq!(&encode_reply(&Reply::simple("PONG"))[..], b"+PONG\r\n");
    assert_eq!(&encode_reply(&Reply::ok())[..], b"+OK\r\n");
}

#[test]
fn test_encode_bulk_string() {
    assert_eq!(&encode_reply(&Reply::bulk("hi"))[..], b"$2\r\nhi\r\n");
    assert_eq!(&encode_reply(&Reply::bulk(""))[..], b"$0\r\n\r\n");
}

#[test]
fn test_encode_bulk_string_uses_byte_length() {
    assert_eq!(&encode_reply(&Reply::bulk("é"))[..], "$2\r\né\r\n".as_bytes());
}

#[test]
fn test_encode_null_bulk_string() {
    assert_eq!(&encode_reply(&Reply::null_bulk())[..], b"$-1\r\n");
}

#[test]
fn test_encode_null() {
    assert_eq!(&encode_reply(&Reply::null())[..], b"_\r\n");
}

#[test]
fn test_encode_error() {
    let reply = Reply::from(CommandError::WrongNumberOfArguments(
        emberkv::protocol::CommandKind::Get,
    ));
    assert_eq!(
        &encode_reply(&reply)[..],
        b"-ERR wrong number of arguments for 'GET' command\r\n"
    );
}

#[test]
fn test_encode_error_already_terminated() {
    let reply = Reply::error("syntax error\r\n");
    assert_eq!(&encode_reply(&reply)[..], b"-ERR syntax error\r\n");
}

#[test]
fn test_encode_unknown_command_error() {
    let reply = Reply::from(CommandError::UnknownCommand("FLUSHALL".to_string()));
    assert_eq!(
        &encode_reply(&reply)[..],
        b"-ERR unknown command 'FLUSHALL'\r\n"
    );
}

// =============================================================================
// Reply Decoding Tests
// =============================================================================

#[test]
fn test_read_reply_all_shapes() {
    let replies = vec![
        Reply::simple("PONG"),
        Reply::bulk("value"),
        Reply::bulk(""),
        Reply::null_bulk(),
        Reply::null(),
        Reply::error("syntax error"),
    ];

    let mut buf = Vec::new();
    for reply in &replies {
        write_reply(&mut buf, reply).unwrap();
    }

    let mut cursor = Cursor::new(buf);
    for expected in replies {
        assert_eq!(read_reply(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_bulk_string_text_survives_encoding() {
    for text in ["", "a", "hello world", "tab\there", "ünïcödé", "$5", "*3"] {
        let encoded = encode_reply(&Reply::bulk(text));
        let mut cursor = Cursor::new(encoded.to_vec());
        assert_eq!(read_reply(&mut cursor).unwrap(), Reply::bulk(text));
    }
}

#[test]
fn test_read_reply_rejects_garbage() {
    let mut cursor = Cursor::new(b"?what\r\n".to_vec());
    assert!(matches!(
        read_reply(&mut cursor),
        Err(EmberError::Protocol(_))
    ));

    let mut cursor = Cursor::new(b"$5\r\nabc\r\n".to_vec());
    assert!(matches!(
        read_reply(&mut cursor),
        Err(EmberError::Protocol(_))
    ));

    let mut cursor = Cursor::new(b"$2\r\nabcdef\r\n".to_vec());
    assert!(matches!(
        read_reply(&mut cursor),
        Err(EmberError::Protocol(_))
    ));
}

#[test]
fn test_read_reply_at_end_of_stream() {
    let mut cursor = Cursor::new(Vec::new());
    match read_reply(&mut cursor) {
        Err(EmberError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
}
