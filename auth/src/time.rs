//! Time source abstraction for deterministic token expiry.
//!
//! Token issuance and validation read the current time through `TimeSource`,
//! so production code uses the system clock while tests pin or advance time
//! explicitly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the wall clock.
pub trait TimeSource: Send + Sync {
    /// Get the current time in whole seconds since Unix epoch.
    fn now_secs(&self) -> u64;
}

/// Real time source using the system clock.
///
/// This is the default implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> u64 {
        // A clock set before 1970 reads as the epoch; every token then looks
        // expired, which fails closed.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_secs())
    }
}

/// A time source that only moves when told to.
///
/// Backed by an atomic so it can be shared with a token service held in an
/// `Arc` across threads.
///
/// # Example
///
/// ```
/// use auth::time::{ManualTimeSource, TimeSource};
///
/// let time = ManualTimeSource::new(1_000);
/// assert_eq!(time.now_secs(), 1_000);
///
/// time.advance(60);
/// assert_eq!(time.now_secs(), 1_060);
/// ```
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    current_secs: AtomicU64,
}

impl ManualTimeSource {
    /// Create a manual time source starting at `initial_secs`.
    #[must_use]
    pub const fn new(initial_secs: u64) -> Self {
        Self {
            current_secs: AtomicU64::new(initial_secs),
        }
    }

    /// Advance time by `secs`, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) {
        // fetch_update only fails when the closure returns None, and it never does.
        let _ = self
            .current_secs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(secs))
            });
    }

    /// Set the current time, possibly moving it backwards.
    pub fn set(&self, secs: u64) {
        self.current_secs.store(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_secs(&self) -> u64 {
        self.current_secs.load(Ordering::SeqCst)
    }
}
