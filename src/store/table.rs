//! Store implementation
//!
//! HashMap-based store with RwLock for concurrency.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use super::{Clock, StoredEntry, SystemClock};

/// Result of [`Store::compare_and_set`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    /// The live entry that was there before, if any
    pub previous: Option<StoredEntry>,

    /// Whether a new entry was stored
    pub written: bool,
}

/// Key-value store with lazy expiry
///
/// ## Concurrency:
/// - `entries`: protected by RwLock (many concurrent readers, one writer)
/// - `get` only upgrades to a write lock when it has to drop an expired entry
/// - `compare_and_set` holds the write lock across check and write, so two
///   conditional writers on one key can never both pass their check
pub struct Store {
    entries: RwLock<HashMap<String, StoredEntry>>,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Create an empty store on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// The clock used for expiry checks
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Get a live entry by key
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<StoredEntry> {
        let entries = self.entries.upgradable_read();
        let entry = entries.get(key)?;
        if !self.is_expired(entry) {
            return Some(entry.clone());
        }

        let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
        entries.remove(key);
        None
    }

    /// Whether a live entry exists; never mutates
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !self.is_expired(entry))
    }

    /// Insert or overwrite unconditionally
    pub fn put(&self, key: impl Into<String>, entry: StoredEntry) {
        self.entries.write().insert(key.into(), entry);
    }

    /// Whether `entry` has expired according to the store's clock
    pub fn is_expired(&self, entry: &StoredEntry) -> bool {
        entry.is_expired_at(self.clock.now())
    }

    /// Atomically inspect and replace one key
    ///
    /// `decide` sees the current live entry (expired entries are passed as
    /// `None`) and returns the entry to store, or `None` to leave the key
    /// alone. Expired entries are dropped either way.
    pub fn compare_and_set<F>(&self, key: &str, decide: F) -> SetOutcome
    where
        F: FnOnce(Option<&StoredEntry>) -> Option<StoredEntry>,
    {
        let mut entries = self.entries.write();

        if entries.get(key).is_some_and(|entry| self.is_expired(entry)) {
            entries.remove(key);
        }

        let previous = entries.get(key).cloned();
        match decide(previous.as_ref()) {
            Some(entry) => {
                entries.insert(key.to_string(), entry);
                SetOutcome {
                    previous,
                    written: true,
                }
            }
            None => SetOutcome {
                previous,
                written: false,
            },
        }
    }

    /// Number of stored entries, including expired ones not yet removed
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
