//! Error types for renewable construction.
//!
//! Only construction can fail. Once a strategy exists, `get` never fails on
//! its own account: it hands back whatever the production function returned.

use std::fmt;
use std::time::Duration;

/// Result type for renewable construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two periods in a pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// The period applied after a successful production.
    Success,
    /// The period applied after a failed production.
    Error,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Success => write!(f, "success"),
            PeriodKind::Error => write!(f, "error"),
        }
    }
}

/// Construction errors.
///
/// Every check runs before a strategy is handed out, so no partially built
/// renewable is ever observable.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No cancellation context was supplied.
    NilContext,

    /// No production function was supplied.
    NilProducer,

    /// A period is negative or not a finite number.
    ///
    /// `std::time::Duration` cannot be negative, so this comes from signed
    /// input: `Periods::try_from_secs_f64` or a `PeriodsConfig`.
    InvalidPeriod {
        /// Which period was rejected
        kind: PeriodKind,
        /// Human readable reason, including the offending value
        reason: String,
    },

    /// A hard period is shorter than the matching soft period.
    InvertedHardSoft {
        /// Category whose ordering is violated
        kind: PeriodKind,
        /// Soft period of that category
        soft: Duration,
        /// Hard period of that category
        hard: Duration,
    },

    /// Configuration could not be parsed.
    ConfigError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NilContext => write!(f, "a cancellation context is required"),
            Error::NilProducer => write!(f, "a production function is required"),
            Error::InvalidPeriod { kind, reason } => {
                write!(f, "{} period must be zero or positive: {}", kind, reason)
            }
            Error::InvertedHardSoft { kind, soft, hard } => write!(
                f,
                "{} hard period must be equal or greater than soft, but got {:?} < {:?}",
                kind, hard, soft
            ),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}
