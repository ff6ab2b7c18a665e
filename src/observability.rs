//! Observability hooks for renewable strategies.
//!
//! Implement [`RenewableMetrics`] to feed your monitoring system:
//!
//! ```ignore
//! use renewable::observability::RenewableMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl RenewableMetrics for PrometheusMetrics {
//!     fn record_produce(&self, duration: Duration, failed: bool) {
//!         // histogram!("renewable_produce_seconds").record(duration);
//!     }
//!     // ... other hooks keep their logging defaults
//! }
//!
//! // let renewable = RenewableBuilder::new()
//! //     .with_metrics(Arc::new(PrometheusMetrics))
//! //     ...
//! ```
//!
//! Unless overridden, strategies use [`LogMetrics`], which logs through the
//! `log` crate. [`NoOpMetrics`] silences everything.
//!
//! # Hooks
//!
//! - `record_fresh()` - cached outcome served within its (soft) period
//! - `record_stale()` - stale outcome served while a refresh runs in the background
//! - `record_produce()` - a production finished; reports how long it took and whether it failed
//! - `record_wait()` - a caller blocked for another caller's production
//!
//! `record_produce` only learns *whether* production failed. The error
//! itself belongs to the caller of `get` and is never reported here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trait for renewable metrics collection.
pub trait RenewableMetrics: Send + Sync {
    /// A valid cached outcome was returned.
    fn record_fresh(&self) {
        trace!("Renewable FRESH");
    }

    /// A stale outcome was returned and a background refresh may be running.
    fn record_stale(&self) {
        debug!("Renewable STALE");
    }

    /// A production finished.
    fn record_produce(&self, duration: Duration, failed: bool) {
        debug!("Renewable PRODUCE took {:?} (failed: {})", duration, failed);
    }

    /// A caller waited for someone else's production.
    fn record_wait(&self, duration: Duration) {
        debug!("Renewable WAIT took {:?}", duration);
    }
}

/// Logs every event through the `log` crate. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMetrics;

impl RenewableMetrics for LogMetrics {}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl RenewableMetrics for NoOpMetrics {
    fn record_fresh(&self) {}
    fn record_stale(&self) {}
    fn record_produce(&self, _duration: Duration, _failed: bool) {}
    fn record_wait(&self, _duration: Duration) {}
}

/// Metrics that count events, for tests and quick diagnostics.
#[derive(Debug, Default)]
pub struct CountingMetrics {
    fresh: AtomicU64,
    stale: AtomicU64,
    produced: AtomicU64,
    failed: AtomicU64,
    waits: AtomicU64,
}

impl CountingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&self) -> u64 {
        self.fresh.load(Ordering::Relaxed)
    }

    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    /// Finished productions, failed ones included.
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn waits(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }
}

impl RenewableMetrics for CountingMetrics {
    fn record_fresh(&self) {
        self.fresh.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    fn record_produce(&self, _duration: Duration, failed: bool) {
        self.produced.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_wait(&self, _duration: Duration) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }
}
