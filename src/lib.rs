//! # renewable
//!
//! A single cached slot holding the latest outcome of an expensive, possibly
//! failing production function, renewed by time without ever running two
//! productions at once.
//!
//! ## Features
//!
//! - **Outcome-aware expiry:** successes and failures expire after their own periods
//! - **Two strategies:** synchronous [`OnDemand`] and stale-while-revalidate [`SoftHard`]
//! - **At most one producer:** concurrent callers never trigger overlapping productions
//! - **Lock-free hot path:** fresh `SoftHard` reads are a single atomic load
//! - **Testable time:** inject a [`clock::ManualClock`] instead of sleeping
//! - **Production Ready:** built-in logging, metrics hooks, and serde configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use renewable::{Periods, RenewableBuilder};
//! use std::time::Duration;
//!
//! // 1. Describe how long outcomes stay valid
//! let soft = Periods::new(Duration::from_secs(60), Duration::from_secs(5));
//! let hard = Periods::new(Duration::from_secs(300), Duration::from_secs(30));
//!
//! // 2. Build the renewable around a production function
//! let token = RenewableBuilder::new()
//!     .with_background_context()
//!     .with_producer(|_ctx| fetch_token())
//!     .soft_hard(soft, hard)?;
//!
//! // 3. Share it; every caller gets the cached outcome or waits for a fresh one
//! let current: Result<String, String> = token.get();
//! # fn fetch_token() -> Result<String, String> { Ok("t".into()) }
//! # Ok::<(), renewable::Error>(())
//! ```
//!
//! ## Choosing a strategy
//!
//! | Strategy | Within period | Past period |
//! |----------|---------------|-------------|
//! | [`OnDemand`] | Return cached | Produce inline, callers wait |
//! | [`SoftHard`] | Return cached | Past soft: return stale, refresh in background. Past hard: produce inline |
//!
//! A zero period means "never valid": every `get` produces.

#[macro_use]
extern crate log;

pub mod builder;
pub mod clock;
pub mod config;
pub mod error;
pub mod observability;
pub mod on_demand;
pub mod periods;
pub mod renewable;
pub mod snapshot;
pub mod soft_hard;
pub mod spawner;

// Re-exports for convenience
pub use builder::RenewableBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PeriodsConfig, StrategyConfig};
pub use error::{Error, PeriodKind, Result};
pub use on_demand::OnDemand;
pub use periods::Periods;
pub use renewable::{must, Renewable};
pub use snapshot::{ProduceFn, Snapshot};
pub use soft_hard::SoftHard;
pub use spawner::Spawner;
pub use tokio_util::sync::CancellationToken;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
