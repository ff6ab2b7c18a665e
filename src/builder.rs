//! Construction of renewable strategies.
//!
//! The builder collects the collaborators a strategy needs and validates all
//! of them before anything is handed out.
//!
//! ```
//! use renewable::{Periods, Renewable, RenewableBuilder};
//! use std::time::Duration;
//!
//! let renewable = RenewableBuilder::new()
//!     .with_background_context()
//!     .with_producer(|_ctx| Ok::<_, String>("fresh"))
//!     .on_demand(Periods::same(Duration::from_secs(30)))
//!     .expect("valid configuration");
//!
//! assert_eq!(renewable.get(), Ok("fresh"));
//! ```
//!
//! # Validation order
//!
//! 1. context (`Error::NilContext`)
//! 2. producer (`Error::NilProducer`)
//! 3. periods (`Error::InvalidPeriod`), soft before hard
//! 4. hard/soft ordering (`Error::InvertedHardSoft`), success before error

use crate::clock::{Clock, SystemClock};
use crate::config::StrategyConfig;
use crate::error::{Error, Result};
use crate::observability::{LogMetrics, RenewableMetrics};
use crate::on_demand::OnDemand;
use crate::periods::Periods;
use crate::renewable::Renewable;
use crate::snapshot::ProduceFn;
use crate::soft_hard::SoftHard;
use crate::spawner::Spawner;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Validated collaborators shared by every strategy.
pub(crate) struct Parts<V, E> {
    pub(crate) ctx: CancellationToken,
    pub(crate) produce: Arc<ProduceFn<V, E>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: Arc<dyn RenewableMetrics>,
    pub(crate) spawner: Spawner,
}

/// Builder for [`OnDemand`] and [`SoftHard`] renewables.
pub struct RenewableBuilder<V, E> {
    context: Option<CancellationToken>,
    produce: Option<Arc<ProduceFn<V, E>>>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn RenewableMetrics>,
    spawner: Spawner,
}

impl<V, E> RenewableBuilder<V, E> {
    /// Empty builder: no context, no producer, system clock, log metrics,
    /// thread spawner.
    pub fn new() -> Self {
        RenewableBuilder {
            context: None,
            produce: None,
            clock: Arc::new(SystemClock),
            metrics: Arc::new(LogMetrics),
            spawner: Spawner::default(),
        }
    }

    /// Token passed to every production call.
    pub fn with_context(mut self, ctx: CancellationToken) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Use a fresh token that nobody cancels.
    pub fn with_background_context(self) -> Self {
        self.with_context(CancellationToken::new())
    }

    pub fn with_producer<F>(mut self, produce: F) -> Self
    where
        F: Fn(&CancellationToken) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        self.produce = Some(Arc::new(produce));
        self
    }

    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Arc<dyn RenewableMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Where soft/hard background refreshes run. Ignored by on-demand.
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    fn into_parts(self) -> Result<Parts<V, E>> {
        let ctx = self.context.ok_or(Error::NilContext)?;
        let produce = self.produce.ok_or(Error::NilProducer)?;

        Ok(Parts {
            ctx,
            produce,
            clock: self.clock,
            metrics: self.metrics,
            spawner: self.spawner,
        })
    }

    /// Build an [`OnDemand`] renewable.
    ///
    /// # Errors
    ///
    /// - `Error::NilContext`: no context was set
    /// - `Error::NilProducer`: no producer was set
    pub fn on_demand(self, periods: Periods) -> Result<OnDemand<V, E>> {
        Ok(OnDemand::from_parts(self.into_parts()?, periods))
    }

    /// Build a [`SoftHard`] renewable.
    ///
    /// # Errors
    ///
    /// - `Error::NilContext`: no context was set
    /// - `Error::NilProducer`: no producer was set
    /// - `Error::InvertedHardSoft`: a hard period is shorter than its soft one
    pub fn soft_hard(self, soft: Periods, hard: Periods) -> Result<SoftHard<V, E>> {
        let parts = self.into_parts()?;
        Periods::ensure_covers(&hard, &soft)?;
        Ok(SoftHard::from_parts(parts, soft, hard))
    }

    /// Build whichever strategy `config` names.
    ///
    /// # Errors
    ///
    /// Everything `on_demand` and `soft_hard` return, plus
    /// `Error::InvalidPeriod` for negative configured periods.
    pub fn build(self, config: &StrategyConfig) -> Result<Box<dyn Renewable<V, E>>>
    where
        V: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        let parts = self.into_parts()?;

        match config {
            StrategyConfig::OnDemand { periods } => {
                let periods = Periods::try_from(*periods)?;
                Ok(Box::new(OnDemand::from_parts(parts, periods)))
            }
            StrategyConfig::SoftHard { soft, hard } => {
                let soft = Periods::try_from(*soft)?;
                let hard = Periods::try_from(*hard)?;
                Periods::ensure_covers(&hard, &soft)?;
                Ok(Box::new(SoftHard::from_parts(parts, soft, hard)))
            }
        }
    }
}

impl<V, E> Default for RenewableBuilder<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
