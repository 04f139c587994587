//! Command validation
//!
//! Checks the shape of a [`CommandCall`] and turns it into a typed
//! [`Command`]. Nothing here touches the store: every error is raised before
//! execution starts.

use crate::error::CommandError;

use super::command::{
    Argument, Command, CommandCall, CommandKind, SetCondition, SetOptions, TtlOption,
};

/// Validate a call and produce the typed command
pub fn validate(call: &CommandCall) -> Result<Command, CommandError> {
    match call.kind {
        CommandKind::Ping => validate_ping(call),
        CommandKind::Echo => validate_echo(call),
        CommandKind::Get => validate_get(call),
        CommandKind::Set => validate_set(call),
    }
}

/// PING [message]
fn validate_ping(call: &CommandCall) -> Result<Command, CommandError> {
    match call.arguments.as_slice() {
        [] => Ok(Command::Ping { message: None }),
        [message] => Ok(Command::Ping {
            message: Some(message.name.clone()),
        }),
        _ => Err(CommandError::WrongNumberOfArguments(call.kind)),
    }
}

/// ECHO message
fn validate_echo(call: &CommandCall) -> Result<Command, CommandError> {
    match call.arguments.as_slice() {
        [message] => Ok(Command::Echo {
            message: message.name.clone(),
        }),
        _ => Err(CommandError::WrongNumberOfArguments(call.kind)),
    }
}

/// GET key
fn validate_get(call: &CommandCall) -> Result<Command, CommandError> {
    match call.arguments.as_slice() {
        [key] => Ok(Command::Get {
            key: key.name.clone(),
        }),
        _ => Err(CommandError::WrongNumberOfArguments(call.kind)),
    }
}

/// SET key value [NX | XX] [GET] [EX s | PX ms | EXAT s | PXAT ms | KEEPTTL]
///
/// The first two arguments are always key and value, whatever they look
/// like. Options may come in any order after them.
fn validate_set(call: &CommandCall) -> Result<Command, CommandError> {
    let (key, value, rest) = match call.arguments.as_slice() {
        [key, value, rest @ ..] => (key, value, rest),
        _ => return Err(CommandError::WrongNumberOfArguments(call.kind)),
    };

    let mut conditions = 0;
    let mut gets = 0;
    let mut ttls = 0;
    for argument in rest {
        match option_class(argument) {
            Some(OptionClass::Condition) => conditions += 1,
            Some(OptionClass::Get) => gets += 1,
            Some(OptionClass::Ttl) => ttls += 1,
            None => return Err(CommandError::Syntax),
        }
    }
    if conditions > 1 || gets > 1 || ttls > 1 {
        return Err(CommandError::Syntax);
    }

    let mut options = SetOptions::default();
    for argument in rest {
        if argument.is("NX") {
            options.condition = Some(SetCondition::IfAbsent);
        } else if argument.is("XX") {
            options.condition = Some(SetCondition::IfPresent);
        } else if argument.is("GET") {
            options.get = true;
        } else {
            options.ttl = Some(parse_ttl(argument)?);
        }
    }

    Ok(Command::Set {
        key: key.name.clone(),
        value: value.name.clone(),
        options,
    })
}

enum OptionClass {
    Condition,
    Get,
    Ttl,
}

fn option_class(argument: &Argument) -> Option<OptionClass> {
    if argument.is("NX") || argument.is("XX") {
        Some(OptionClass::Condition)
    } else if argument.is("GET") {
        Some(OptionClass::Get)
    } else if ["EX", "PX", "EXAT", "PXAT", "KEEPTTL"]
        .iter()
        .any(|name| argument.is(name))
    {
        Some(OptionClass::Ttl)
    } else {
        None
    }
}

/// Parse a TTL option whose name is already known to be valid
fn parse_ttl(argument: &Argument) -> Result<TtlOption, CommandError> {
    if argument.is("KEEPTTL") {
        return Ok(TtlOption::KeepTtl);
    }

    let amount = parse_number(argument.value.as_deref())?;
    let ttl = if argument.is("EX") {
        TtlOption::Ex(amount)
    } else if argument.is("PX") {
        TtlOption::Px(amount)
    } else if argument.is("EXAT") {
        TtlOption::ExAt(amount)
    } else {
        TtlOption::PxAt(amount)
    };

    // Seconds are turned into milliseconds at execution time
    if matches!(ttl, TtlOption::Ex(_) | TtlOption::ExAt(_)) && amount.checked_mul(1000).is_none()
    {
        return Err(CommandError::InvalidValueType);
    }

    Ok(ttl)
}

/// Unsigned decimal digits only; no sign, no whitespace
fn parse_number(value: Option<&str>) -> Result<u64, CommandError> {
    let value = value.ok_or(CommandError::InvalidValueType)?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidValueType);
    }
    value.parse().map_err(|_| CommandError::InvalidValueType)
}
