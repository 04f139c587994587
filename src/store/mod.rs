//! Store Module
//!
//! In-memory map from key to value-with-expiry.
//!
//! ## Responsibilities
//! - Expiry-aware reads: an expired entry reads as absent
//! - Lazy removal of expired entries when they are read
//! - Atomic check-and-set for the conditional forms of SET
//!
//! There is no background sweeper. An expired key stays in the map until
//! something looks at it.
//!
//! ## Data Structure Choice
//! A `HashMap` behind one `parking_lot::RwLock`:
//! - Reads share the lock
//! - Writes, and every read-check-write sequence, take it exclusively

mod clock;
mod table;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use table::{SetOutcome, Store};

/// How an entry expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Lives until overwritten
    Never,

    /// Expires `ttl_ms` milliseconds after the entry was written
    After { ttl_ms: u64 },

    /// Expires at a fixed point in time
    At(Timestamp),
}

/// One key's current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub value: String,
    pub created_at: Timestamp,
    pub expiry: Expiry,
}

impl StoredEntry {
    pub fn new(value: impl Into<String>, created_at: Timestamp, expiry: Expiry) -> Self {
        Self {
            value: value.into(),
            created_at,
            expiry,
        }
    }

    /// The instant after which the entry counts as expired, if any
    pub fn expires_at(&self) -> Option<Timestamp> {
        match self.expiry {
            Expiry::Never => None,
            Expiry::After { ttl_ms } => Some(self.created_at.saturating_add_millis(ttl_ms)),
            Expiry::At(due) => Some(due),
        }
    }

    /// Expired once `now` is strictly past the due point
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at().is_some_and(|due| now > due)
    }
}
