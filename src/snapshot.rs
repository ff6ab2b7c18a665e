//! The timestamped outcome of one production.

use crate::clock::Clock;
use crate::observability::RenewableMetrics;
use crate::periods::Periods;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Production function: computes a fresh value or fails.
///
/// It receives the cancellation token given at construction; honoring it is
/// up to the function.
pub type ProduceFn<V, E> = dyn Fn(&CancellationToken) -> Result<V, E> + Send + Sync;

/// Outcome of a production together with the moment it finished.
///
/// Snapshots are immutable. Strategies replace the whole snapshot at once,
/// so a reader never sees the value of one production paired with the
/// timestamp of another.
#[derive(Clone, Debug)]
pub struct Snapshot<V, E> {
    outcome: Result<V, E>,
    produced_at: Instant,
}

impl<V, E> Snapshot<V, E> {
    pub fn new(outcome: Result<V, E>, produced_at: Instant) -> Self {
        Snapshot {
            outcome,
            produced_at,
        }
    }

    /// Run `produce` and stamp the outcome with the clock's time on return.
    pub(crate) fn produce(
        ctx: &CancellationToken,
        produce: &ProduceFn<V, E>,
        clock: &dyn Clock,
        metrics: &dyn RenewableMetrics,
    ) -> Self {
        let started = Instant::now();
        let outcome = produce(ctx);
        metrics.record_produce(started.elapsed(), outcome.is_err());
        Snapshot::new(outcome, clock.now())
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn produced_at(&self) -> Instant {
        self.produced_at
    }

    pub fn outcome_ref(&self) -> &Result<V, E> {
        &self.outcome
    }

    /// Whether the outcome is still valid at `now`.
    ///
    /// Valid while `produced_at + period > now`, where the period depends on
    /// whether the outcome is an error. A deadline past the representable
    /// range never expires.
    pub fn is_valid_at(&self, now: Instant, periods: &Periods) -> bool {
        let period = periods.period_for(self.is_error());
        match self.produced_at.checked_add(period) {
            Some(deadline) => deadline > now,
            None => true,
        }
    }
}

impl<V: Clone, E: Clone> Snapshot<V, E> {
    /// Copy of the outcome, as handed to callers of `get`.
    pub fn outcome(&self) -> Result<V, E> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::observability::NoOpMetrics;
    use std::time::Duration;

    fn periods() -> Periods {
        Periods::new(Duration::from_millis(75), Duration::from_millis(100))
    }

    #[test]
    fn test_success_uses_success_period() {
        let clock = ManualClock::new();
        let snapshot: Snapshot<u32, String> = Snapshot::new(Ok(7), clock.now());

        assert!(snapshot.is_valid_at(clock.now() + Duration::from_millis(74), &periods()));
        assert!(!snapshot.is_valid_at(clock.now() + Duration::from_millis(75), &periods()));
    }

    #[test]
    fn test_error_uses_error_period() {
        let clock = ManualClock::new();
        let snapshot: Snapshot<u32, String> = Snapshot::new(Err("boom".into()), clock.now());

        assert!(snapshot.is_error());
        assert!(snapshot.is_valid_at(clock.now() + Duration::from_millis(99), &periods()));
        assert!(!snapshot.is_valid_at(clock.now() + Duration::from_millis(100), &periods()));
    }

    #[test]
    fn test_zero_period_is_never_valid() {
        let clock = ManualClock::new();
        let snapshot: Snapshot<u32, String> = Snapshot::new(Ok(1), clock.now());

        assert!(!snapshot.is_valid_at(clock.now(), &Periods::default()));
    }

    #[test]
    fn test_overflowing_deadline_never_expires() {
        let clock = ManualClock::new();
        let snapshot: Snapshot<u32, String> = Snapshot::new(Ok(1), clock.now());
        let forever = Periods::same(Duration::MAX);

        assert!(snapshot.is_valid_at(clock.now() + Duration::from_secs(3600), &forever));
    }

    #[test]
    fn test_produce_stamps_with_clock() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(42));
        let ctx = CancellationToken::new();
        let produce = |_: &CancellationToken| -> Result<u32, String> { Ok(5) };

        let snapshot = Snapshot::<u32, String>::produce(&ctx, &produce, &clock, &NoOpMetrics);
        assert_eq!(snapshot.outcome(), Ok(5));
        assert_eq!(snapshot.produced_at(), clock.now());
    }
}
