//! On-demand strategy: produce synchronously whenever the outcome expired.
//!
//! The first `get` produces and caches the outcome. Later calls compare the
//! current time against the period of the cached outcome (success or error)
//! and produce again only once it expired.
//!
//! Readers share a read lock on the fast path. Production happens under the
//! write lock, so productions never overlap and callers that arrive while one
//! runs wait for it and return its outcome.

use crate::builder::{Parts, RenewableBuilder};
use crate::clock::Clock;
use crate::error::Result;
use crate::observability::RenewableMetrics;
use crate::periods::Periods;
use crate::renewable::Renewable;
use crate::snapshot::{ProduceFn, Snapshot};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Renewable that produces on demand under a read-write lock.
pub struct OnDemand<V, E> {
    ctx: CancellationToken,
    produce: Arc<ProduceFn<V, E>>,
    periods: Periods,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn RenewableMetrics>,
    result: RwLock<Option<Arc<Snapshot<V, E>>>>,
}

impl<V, E> OnDemand<V, E> {
    /// On-demand renewable with a background context and default collaborators.
    pub fn new<F>(produce: F, periods: Periods) -> Result<Self>
    where
        F: Fn(&CancellationToken) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        RenewableBuilder::new()
            .with_background_context()
            .with_producer(produce)
            .on_demand(periods)
    }

    pub(crate) fn from_parts(parts: Parts<V, E>, periods: Periods) -> Self {
        OnDemand {
            ctx: parts.ctx,
            produce: parts.produce,
            periods,
            clock: parts.clock,
            metrics: parts.metrics,
            result: RwLock::new(None),
        }
    }

    pub fn periods(&self) -> Periods {
        self.periods
    }

    /// Current snapshot, valid or not, without producing.
    pub fn peek(&self) -> Option<Arc<Snapshot<V, E>>> {
        self.result.read().clone()
    }

    fn valid_now(&self, slot: &Option<Arc<Snapshot<V, E>>>) -> Option<Arc<Snapshot<V, E>>> {
        slot.as_ref()
            .filter(|res| res.is_valid_at(self.clock.now(), &self.periods))
            .cloned()
    }
}

impl<V: Clone, E: Clone> OnDemand<V, E> {
    /// Return the cached outcome, or produce a new one if it expired.
    pub fn get(&self) -> std::result::Result<V, E> {
        let invoked_at = self.clock.now();

        if let Some(res) = self.valid_now(&self.result.read()) {
            self.metrics.record_fresh();
            return res.outcome();
        }

        let mut slot = self.result.write();

        // Someone else may have produced while we waited for the write lock.
        if let Some(res) = self.valid_now(&slot) {
            self.metrics.record_wait(self.clock.now().saturating_duration_since(invoked_at));
            return res.outcome();
        }
        if let Some(res) = slot.as_ref().filter(|res| res.produced_at() > invoked_at) {
            return res.outcome();
        }

        let res = Arc::new(Snapshot::produce(
            &self.ctx,
            &*self.produce,
            &*self.clock,
            &*self.metrics,
        ));
        *slot = Some(Arc::clone(&res));
        res.outcome()
    }
}

impl<V, E> Renewable<V, E> for OnDemand<V, E>
where
    V: Clone + Send + Sync,
    E: Clone + Send + Sync,
{
    fn get(&self) -> std::result::Result<V, E> {
        OnDemand::get(self)
    }
}
