//! Framework error type.
//!
//! Sub-crates define their own error enums; this one covers the shared
//! configuration failures of the core types.

use thiserror::Error;

use crate::Period;

/// The top-level error type for `abm-core`.
#[derive(Debug, Error)]
pub enum AbmError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("period {period} is outside a day of {periods} periods")]
    PeriodOutOfDay { period: Period, periods: u16 },
}

/// Shorthand result type for `abm-core`.
pub type AbmResult<T> = Result<T, AbmError>;
