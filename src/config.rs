//! Serde-backed configuration for renewable strategies.
//!
//! Periods are written as signed milliseconds so that a negative value in a
//! config file is reported as `Error::InvalidPeriod` instead of failing to
//! parse.
//!
//! ```
//! use renewable::config::StrategyConfig;
//!
//! let config = StrategyConfig::from_json(r#"{
//!     "strategy": "soft_hard",
//!     "soft": { "success_ms": 75, "error_ms": 100 },
//!     "hard": { "success_ms": 150, "error_ms": 200 }
//! }"#).expect("valid config");
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, PeriodKind, Result};
use crate::periods::Periods;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A success/error period pair in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodsConfig {
    pub success_ms: i64,
    pub error_ms: i64,
}

impl PeriodsConfig {
    /// Fails with `Error::InvalidPeriod` if either period is negative.
    pub fn validate(&self) -> Result<()> {
        non_negative(PeriodKind::Success, self.success_ms)?;
        non_negative(PeriodKind::Error, self.error_ms)?;
        Ok(())
    }
}

fn non_negative(kind: PeriodKind, millis: i64) -> Result<Duration> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| Error::InvalidPeriod {
            kind,
            reason: format!("got {}ms", millis),
        })
}

impl TryFrom<PeriodsConfig> for Periods {
    type Error = Error;

    fn try_from(config: PeriodsConfig) -> Result<Self> {
        Ok(Periods::new(
            non_negative(PeriodKind::Success, config.success_ms)?,
            non_negative(PeriodKind::Error, config.error_ms)?,
        ))
    }
}

impl From<Periods> for PeriodsConfig {
    fn from(periods: Periods) -> Self {
        let millis = |d: Duration| i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        PeriodsConfig {
            success_ms: millis(periods.success),
            error_ms: millis(periods.error),
        }
    }
}

/// Which strategy to build, and its periods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Synchronous production whenever the outcome expired.
    OnDemand { periods: PeriodsConfig },
    /// Stale-while-revalidate between the soft and hard deadlines.
    SoftHard {
        soft: PeriodsConfig,
        hard: PeriodsConfig,
    },
}

impl StrategyConfig {
    /// Parse a JSON document.
    ///
    /// Only the shape is checked here; call [`validate`](Self::validate) or
    /// hand the config to `RenewableBuilder::build` to check the values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check period signs and, for soft/hard, that hard covers soft.
    pub fn validate(&self) -> Result<()> {
        match self {
            StrategyConfig::OnDemand { periods } => periods.validate(),
            StrategyConfig::SoftHard { soft, hard } => {
                let soft = Periods::try_from(*soft)?;
                let hard = Periods::try_from(*hard)?;
                Periods::ensure_covers(&hard, &soft)
            }
        }
    }
}
