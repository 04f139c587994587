//! Engine Module
//!
//! Executes commands against the shared store.
//!
//! ## Responsibilities
//! - Turn raw request tokens into a validated command
//! - Run the command against the store
//! - Map every outcome, including request errors, to a [`Reply`]
//!
//! Each request stands alone: there is no per-connection state.

use std::sync::Arc;

use crate::error::CommandError;
use crate::protocol::{validate, Command, CommandCall, Reply, SetCondition, SetOptions, TtlOption};
use crate::store::{Clock, Expiry, StoredEntry, Store, Timestamp};

/// The command executor
///
/// Shared between all connection threads behind an `Arc`. All
/// synchronization lives inside [`Store`].
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Create an engine with an empty store on the wall clock
    pub fn new() -> Self {
        Self {
            store: Store::new(),
        }
    }

    /// Create an engine with an empty store on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Store::with_clock(clock),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Handle the raw tokens of one request
    ///
    /// Request errors never escape: they come back as error replies.
    pub fn handle(&self, tokens: Vec<String>) -> Reply {
        match self.prepare(tokens) {
            Ok(command) => self.execute(command),
            Err(e) => Reply::from(e),
        }
    }

    /// Interpret and validate tokens without touching the store
    pub fn prepare(&self, tokens: Vec<String>) -> Result<Command, CommandError> {
        let call = CommandCall::from_tokens(tokens)?;
        validate(&call)
    }

    /// Execute a validated command
    pub fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Ping { message: None } => Reply::simple("PONG"),
            Command::Ping {
                message: Some(message),
            } => Reply::bulk(message),
            Command::Echo { message } => Reply::bulk(message),
            Command::Get { key } => self.get(&key),
            Command::Set {
                key,
                value,
                options,
            } => self.set(&key, value, options),
        }
    }

    /// GET: value of a live key, or null
    pub fn get(&self, key: &str) -> Reply {
        match self.store.get(key) {
            Some(entry) => Reply::bulk(entry.value),
            None => Reply::null(),
        }
    }

    /// SET with all its modifiers
    ///
    /// The existence check, previous-value capture, expiry carry-over and
    /// the write itself all happen inside one store critical section.
    pub fn set(&self, key: &str, value: String, options: SetOptions) -> Reply {
        let now = self.store.clock().now();

        let outcome = self.store.compare_and_set(key, |current| {
            let blocked = match options.condition {
                Some(SetCondition::IfAbsent) => current.is_some(),
                Some(SetCondition::IfPresent) => current.is_none(),
                None => false,
            };
            if blocked {
                return None;
            }

            let expiry = match options.ttl {
                Some(ttl) => expiry_for(ttl, current),
                None => Expiry::Never,
            };
            Some(StoredEntry::new(value, now, expiry))
        });

        if options.get {
            return match outcome.previous {
                Some(previous) => Reply::bulk(previous.value),
                None => Reply::null(),
            };
        }

        if outcome.written {
            Reply::ok()
        } else {
            Reply::null()
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Expiry of a freshly written entry
///
/// `current` is the live entry being replaced. KEEPTTL copies its expiry
/// descriptor as stored.
fn expiry_for(ttl: TtlOption, current: Option<&StoredEntry>) -> Expiry {
    match ttl {
        TtlOption::Ex(secs) => Expiry::After {
            ttl_ms: secs.saturating_mul(1000),
        },
        TtlOption::Px(millis) => Expiry::After { ttl_ms: millis },
        TtlOption::ExAt(secs) => {
            Expiry::At(Timestamp::from_unix_millis(secs.saturating_mul(1000)))
        }
        TtlOption::PxAt(millis) => Expiry::At(Timestamp::from_unix_millis(millis)),
        TtlOption::KeepTtl => current.map_or(Expiry::Never, |entry| entry.expiry),
    }
}
