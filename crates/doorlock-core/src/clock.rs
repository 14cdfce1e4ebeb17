//! Monotonic time source for debounce and sequence deadlines.
//!
//! The controller never sleeps. It reads the current tick from a [`Clock`]
//! on every poll and compares it with stored deadlines, so tests can drive
//! time explicitly with [`ManualClock`] instead of waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic tick source.
///
/// `now()` returns the time elapsed since the clock's own origin. Values must
/// never decrease.
pub trait Clock: Send + Sync {
    /// Current tick.
    fn now(&self) -> Duration;
}

/// Clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests and simulation.
///
/// Clones share the same counter, so a test can keep one handle while the
/// controller owns another.
///
/// # Examples
///
/// ```
/// use doorlock_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
///
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(shared.now(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `by` (millisecond resolution).
    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(duration_to_millis(by), Ordering::SeqCst);
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute tick. Ignored if it would move the clock backwards.
    pub fn set(&self, at: Duration) {
        self.millis
            .fetch_max(duration_to_millis(at), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
