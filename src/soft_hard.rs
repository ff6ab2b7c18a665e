//! Soft/hard strategy: serve stale outcomes while refreshing in the background.
//!
//! Each outcome has two deadlines, taken from the soft and the hard periods
//! (success or error periods, depending on the outcome):
//!
//! ```text
//!   produced_at        soft deadline           hard deadline
//!        |------ fresh ------|------ stale --------|------ expired ------>
//!        return cached       return cached,         block until a new
//!                            refresh in background   outcome is produced
//! ```
//!
//! Only one production runs at a time. A two-state flag (`IDLE` /
//! `REFRESHING`) elects the producer with a compare-and-swap. Fresh reads
//! take no lock at all, only an atomic load of the current snapshot. Callers
//! past the hard deadline that lose the election wait on a condition
//! variable until the flag returns to `IDLE`, then re-check.
//!
//! A production function that panics unwinds through the caller of `get`
//! (or kills the background job); the slot is still released, so the next
//! caller past a deadline tries again.

use crate::builder::{Parts, RenewableBuilder};
use crate::clock::Clock;
use crate::error::Result;
use crate::observability::RenewableMetrics;
use crate::periods::Periods;
use crate::renewable::Renewable;
use crate::snapshot::{ProduceFn, Snapshot};
use crate::spawner::Spawner;
use arc_swap::ArcSwapOption;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

const IDLE: u8 = 0;
const REFRESHING: u8 = 1;

/// Renewable with soft and hard deadlines.
///
/// Dropping it while a background refresh runs is fine: the refresh
/// finishes and its outcome is discarded.
pub struct SoftHard<V, E> {
    shared: Arc<Shared<V, E>>,
}

struct Shared<V, E> {
    ctx: CancellationToken,
    produce: Arc<ProduceFn<V, E>>,
    soft: Periods,
    hard: Periods,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn RenewableMetrics>,
    spawner: Spawner,

    result: ArcSwapOption<Snapshot<V, E>>,
    state: AtomicU8,
    lock: Mutex<()>,
    condition: Condvar,
}

impl<V, E> Shared<V, E> {
    /// Give the slot back and wake every waiter.
    ///
    /// The store happens under the lock so a waiter cannot miss it between
    /// its check and its wait.
    fn release(&self) {
        let _guard = self.lock.lock();
        self.state.store(IDLE, Ordering::Release);
        self.condition.notify_all();
    }

    fn produce(&self) -> Arc<Snapshot<V, E>> {
        let res = Arc::new(Snapshot::produce(
            &self.ctx,
            &*self.produce,
            &*self.clock,
            &*self.metrics,
        ));
        self.result.store(Some(Arc::clone(&res)));
        res
    }

    /// Snapshot a blocked caller may return: soft-valid now, or produced
    /// after the caller arrived.
    fn settled(&self, invoked_at: Instant) -> Option<Arc<Snapshot<V, E>>> {
        let res = self.result.load_full()?;
        let fresh = res.is_valid_at(self.clock.now(), &self.soft);
        (fresh || res.produced_at() > invoked_at).then_some(res)
    }
}

/// Ownership of the production slot. Dropping it flips the flag back to
/// `IDLE` and wakes waiters, including when a refresh job is dropped unrun
/// or the production function unwinds.
struct Slot<V, E> {
    shared: Arc<Shared<V, E>>,
}

impl<V, E> Slot<V, E> {
    fn produce(&self) -> Arc<Snapshot<V, E>> {
        self.shared.produce()
    }
}

impl<V, E> Drop for Slot<V, E> {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl<V, E> SoftHard<V, E> {
    /// Soft/hard renewable with a background context and default collaborators.
    pub fn new<F>(produce: F, soft: Periods, hard: Periods) -> Result<Self>
    where
        F: Fn(&CancellationToken) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        RenewableBuilder::new()
            .with_background_context()
            .with_producer(produce)
            .soft_hard(soft, hard)
    }

    /// Callers must have checked that `hard` covers `soft`.
    pub(crate) fn from_parts(parts: Parts<V, E>, soft: Periods, hard: Periods) -> Self {
        SoftHard {
            shared: Arc::new(Shared {
                ctx: parts.ctx,
                produce: parts.produce,
                soft,
                hard,
                clock: parts.clock,
                metrics: parts.metrics,
                spawner: parts.spawner,
                result: ArcSwapOption::empty(),
                state: AtomicU8::new(IDLE),
                lock: Mutex::new(()),
                condition: Condvar::new(),
            }),
        }
    }

    pub fn soft(&self) -> Periods {
        self.shared.soft
    }

    pub fn hard(&self) -> Periods {
        self.shared.hard
    }

    /// Take the production slot if nobody holds it.
    fn try_acquire(&self) -> Option<Slot<V, E>> {
        self.shared
            .state
            .compare_exchange(IDLE, REFRESHING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Slot {
                shared: Arc::clone(&self.shared),
            })
    }

    /// Whether a production is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) == REFRESHING
    }

    /// Current snapshot, valid or not, without producing.
    pub fn peek(&self) -> Option<Arc<Snapshot<V, E>>> {
        self.shared.result.load_full()
    }
}

impl<V, E> SoftHard<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Return the cached outcome, refreshing it in the background past the
    /// soft deadline and blocking for a new one past the hard deadline.
    pub fn get(&self) -> std::result::Result<V, E> {
        let shared = &*self.shared;
        let invoked_at = shared.clock.now();

        let loaded = shared.result.load();
        if let Some(res) = &*loaded {
            if res.is_valid_at(invoked_at, &shared.soft) {
                shared.metrics.record_fresh();
                return res.outcome();
            }

            if res.is_valid_at(invoked_at, &shared.hard) {
                shared.metrics.record_stale();
                if let Some(slot) = self.try_acquire() {
                    // A refresh may have landed between the load and the CAS.
                    match shared.result.load_full() {
                        Some(current) if current.is_valid_at(invoked_at, &shared.soft) => {
                            drop(slot);
                            return current.outcome();
                        }
                        _ => self.refresh_async(slot),
                    }
                }
                return res.outcome();
            }
        }
        drop(loaded);

        self.get_blocking(invoked_at)
    }

    /// Produce on a detached job that owns the slot until it finishes.
    fn refresh_async(&self, slot: Slot<V, E>) {
        debug!("Renewable spawning background refresh");

        // On failure the job, and with it the slot, is already dropped.
        if let Err(e) = self.shared.spawner.spawn(move || {
            slot.produce();
        }) {
            warn!("Renewable failed to spawn background refresh: {}", e);
        }
    }

    fn get_blocking(&self, invoked_at: Instant) -> std::result::Result<V, E> {
        let shared = &*self.shared;
        let mut guard = shared.lock.lock();
        let mut waiting_since: Option<Instant> = None;

        loop {
            if let Some(res) = shared.settled(invoked_at) {
                if let Some(since) = waiting_since {
                    shared.metrics.record_wait(since.elapsed());
                }
                return res.outcome();
            }

            if let Some(slot) = self.try_acquire() {
                // Releasing the slot takes the lock, so let go of it first.
                drop(guard);
                debug!("Renewable past hard deadline, producing inline");
                let res = slot.produce();
                drop(slot);
                return res.outcome();
            }

            // Broadcast wakes everyone; the loop re-tests before trusting it.
            waiting_since.get_or_insert_with(Instant::now);
            shared.condition.wait(&mut guard);
        }
    }
}

impl<V, E> Renewable<V, E> for SoftHard<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn get(&self) -> std::result::Result<V, E> {
        SoftHard::get(self)
    }
}
