//! Command Call Tests
//!
//! Tests verify:
//! - Command name matching (case-insensitive)
//! - Unknown commands
//! - Grouping of option values with their option names

use emberkv::protocol::{Argument, CommandCall, CommandKind};
use emberkv::CommandError;

fn call(items: &[&str]) -> Result<CommandCall, CommandError> {
    CommandCall::from_tokens(items.iter().map(|s| s.to_string()).collect())
}

// =============================================================================
// Command Kind Tests
// =============================================================================

#[test]
fn test_command_names_are_case_insensitive() {
    assert_eq!(CommandKind::from_token("ping"), Some(CommandKind::Ping));
    assert_eq!(CommandKind::from_token("Echo"), Some(CommandKind::Echo));
    assert_eq!(CommandKind::from_token("GET"), Some(CommandKind::Get));
    assert_eq!(CommandKind::from_token("sEt"), Some(CommandKind::Set));
    assert_eq!(CommandKind::from_token("DEL"), None);
}

#[test]
fn test_command_kind_display_is_upper_case() {
    assert_eq!(CommandKind::Get.to_string(), "GET");
    assert_eq!(CommandKind::Set.to_string(), "SET");
}

#[test]
fn test_unknown_command_carries_token() {
    let err = call(&["flushall", "now"]).unwrap_err();
    assert_eq!(err, CommandError::UnknownCommand("flushall".to_string()));
    assert_eq!(err.to_string(), "unknown command 'flushall'");
}

#[test]
fn test_empty_token_list_is_invalid_format() {
    assert_eq!(call(&[]).unwrap_err(), CommandError::InvalidRespFormat);
}

// =============================================================================
// Argument Grouping Tests
// =============================================================================

#[test]
fn test_plain_arguments() {
    let parsed = call(&["SET", "key", "value", "NX", "GET"]).unwrap();
    assert_eq!(parsed.kind, CommandKind::Set);
    assert_eq!(
        parsed.arguments,
        vec![
            Argument::new("key"),
            Argument::new("value"),
            Argument::new("NX"),
            Argument::new("GET"),
        ]
    );
}

#[test]
fn test_value_options_consume_next_token() {
    let parsed = call(&["SET", "k", "v", "px", "1500", "XX"]).unwrap();
    assert_eq!(
        parsed.arguments,
        vec![
            Argument::new("k"),
            Argument::new("v"),
            Argument::with_value("px", "1500"),
            Argument::new("XX"),
        ]
    );
}

#[test]
fn test_every_value_option_is_grouped() {
    for option in ["EX", "PX", "EXAT", "PXAT", "ex", "Pxat"] {
        let parsed = call(&["SET", "k", "v", option, "7"]).unwrap();
        assert_eq!(parsed.arguments.len(), 3, "option {}", option);
        assert_eq!(parsed.arguments[2], Argument::with_value(option, "7"));
    }
}

#[test]
fn test_keepttl_takes_no_value() {
    let parsed = call(&["SET", "k", "v", "KEEPTTL", "GET"]).unwrap();
    assert_eq!(parsed.arguments[2], Argument::new("KEEPTTL"));
    assert_eq!(parsed.arguments[3], Argument::new("GET"));
}

#[test]
fn test_trailing_value_option_has_no_value() {
    let parsed = call(&["SET", "k", "v", "EX"]).unwrap();
    assert_eq!(
        parsed.arguments[2],
        Argument {
            name: "EX".to_string(),
            value: None,
        }
    );
}

#[test]
fn test_option_names_in_key_position_are_grouped_too() {
    // Grouping happens before any command-specific interpretation
    let parsed = call(&["GET", "EX", "5"]).unwrap();
    assert_eq!(parsed.arguments, vec![Argument::with_value("EX", "5")]);
}

#[test]
fn test_argument_is_matches_ignoring_case() {
    let arg = Argument::new("KeepTtl");
    assert!(arg.is("KEEPTTL"));
    assert!(!arg.is("KEEP"));
}
