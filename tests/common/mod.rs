//! Shared fixtures for integration tests.

#![allow(dead_code)]

use renewable::CancellationToken;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SUCCESS_PERIOD: Duration = Duration::from_millis(75);
pub const ERROR_PERIOD: Duration = Duration::from_millis(100);

/// Error produced by the test production functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure(pub u64);

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counts productions and tracks how many ran at once.
#[derive(Debug, Default)]
pub struct Probe {
    calls: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Register a production; returns its index and a guard ending it.
    pub fn enter(&self) -> (u64, InFlight<'_>) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        (index, InFlight(self))
    }
}

pub struct InFlight<'a>(&'a Probe);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Outcome of the n-th production: `Ok(0), Err(0), Ok(1), Err(1), ...`
pub fn alternating_outcome(n: u64) -> Result<u64, Failure> {
    if n % 2 == 0 {
        Ok(n / 2)
    } else {
        Err(Failure(n / 2))
    }
}

/// Production function yielding [`alternating_outcome`] in call order.
pub fn alternating(
    probe: Arc<Probe>,
) -> impl Fn(&CancellationToken) -> Result<u64, Failure> + Send + Sync + 'static {
    move |_: &CancellationToken| {
        let (n, _in_flight) = probe.enter();
        alternating_outcome(n)
    }
}

/// Like [`alternating`], but every production after the first takes `delay`.
pub fn slow_alternating(
    probe: Arc<Probe>,
    delay: Duration,
) -> impl Fn(&CancellationToken) -> Result<u64, Failure> + Send + Sync + 'static {
    move |_: &CancellationToken| {
        let (n, _in_flight) = probe.enter();
        if n > 0 {
            std::thread::sleep(delay);
        }
        alternating_outcome(n)
    }
}

/// Poll until `done` holds, failing the test after a few seconds.
pub fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(1));
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
