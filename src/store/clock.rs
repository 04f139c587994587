//! Time source for expiry checks
//!
//! The store never reads the wall clock directly; it asks a [`Clock`].
//! [`ManualClock`] lets tests move time forward without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    #[inline]
    pub fn from_unix_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns `None` if the value does not fit in milliseconds
    pub fn from_unix_secs(secs: u64) -> Option<Self> {
        secs.checked_mul(1000).map(Self)
    }

    #[inline]
    pub fn as_unix_millis(&self) -> u64 {
        self.0
    }

    /// Saturates at the end of representable time
    pub fn saturating_add_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        let dur = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Timestamp(dur.as_millis() as u64)
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(AtomicU64::new(start.0))
    }

    pub fn set(&self, to: Timestamp) {
        self.0.store(to.0, Ordering::SeqCst);
    }

    /// Saturates at the end of representable time
    pub fn advance_millis(&self, millis: u64) {
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(millis))
            });
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_millis(secs.saturating_mul(1000));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.0.load(Ordering::SeqCst))
    }
}
