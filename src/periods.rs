//! Validity periods for a cached outcome.
//!
//! A [`Periods`] pair holds one duration for successful productions and one
//! for failed ones. The outcome of the last production picks which applies.
//!
//! ```
//! use renewable::Periods;
//! use std::time::Duration;
//!
//! let periods = Periods::new(Duration::from_millis(75), Duration::from_millis(100));
//! assert_eq!(periods.period_for(false), Duration::from_millis(75));
//! assert_eq!(periods.period_for(true), Duration::from_millis(100));
//! ```
//!
//! A zero period is legal and means the outcome is never valid, so every
//! `get` produces again.

use crate::error::{Error, PeriodKind, Result};
use std::time::Duration;

/// Success and error validity periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Periods {
    /// How long a successful outcome stays valid.
    pub success: Duration,
    /// How long a failed outcome stays valid.
    pub error: Duration,
}

impl Periods {
    pub const fn new(success: Duration, error: Duration) -> Self {
        Periods { success, error }
    }

    /// Same period for both outcomes.
    pub const fn same(period: Duration) -> Self {
        Periods {
            success: period,
            error: period,
        }
    }

    /// Build from signed seconds, rejecting negative or non-finite values.
    pub fn try_from_secs_f64(success: f64, error: f64) -> Result<Self> {
        Ok(Periods {
            success: checked_secs(PeriodKind::Success, success)?,
            error: checked_secs(PeriodKind::Error, error)?,
        })
    }

    /// Period that applies to an outcome.
    pub const fn period_for(&self, is_error: bool) -> Duration {
        if is_error {
            self.error
        } else {
            self.success
        }
    }

    /// Period of the given category.
    pub const fn of(&self, kind: PeriodKind) -> Duration {
        match kind {
            PeriodKind::Success => self.success,
            PeriodKind::Error => self.error,
        }
    }

    /// Fails unless every period of `hard` is at least the matching one of `soft`.
    pub(crate) fn ensure_covers(hard: &Periods, soft: &Periods) -> Result<()> {
        for kind in [PeriodKind::Success, PeriodKind::Error] {
            if hard.of(kind) < soft.of(kind) {
                return Err(Error::InvertedHardSoft {
                    kind,
                    soft: soft.of(kind),
                    hard: hard.of(kind),
                });
            }
        }
        Ok(())
    }
}

fn checked_secs(kind: PeriodKind, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| Error::InvalidPeriod {
        kind,
        reason: format!("{}s ({})", secs, e),
    })
}
