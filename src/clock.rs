//! Time sources.
//!
//! Strategies read "now" through a [`Clock`] so tests can drive expiry
//! without sleeping. [`SystemClock`] is the default.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reads `Instant::now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a renewable.
///
/// ```
/// use renewable::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(80));
/// assert_eq!(clock.now() - start, Duration::from_millis(80));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed_nanos.fetch_add(saturating_nanos(by), Ordering::SeqCst);
    }

    /// Jump to an absolute offset from the clock's creation.
    ///
    /// Going backwards is allowed here, unlike a real monotonic clock; tests
    /// that do so get what they asked for.
    pub fn set_elapsed(&self, elapsed: Duration) {
        self.elapsed_nanos.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    /// Offset from the clock's creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_is_frozen_until_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_millis(70));
        clock.advance(Duration::from_millis(10));
        assert_eq!(clock.now(), start + Duration::from_millis(80));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.set_elapsed(Duration::from_millis(190));
        assert_eq!(clock.elapsed(), Duration::from_millis(190));
    }
}
