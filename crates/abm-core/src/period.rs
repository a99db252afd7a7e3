//! Discretized time-of-day model.
//!
//! # Design
//!
//! A day is cut into `periods` equal bins (e.g. 48 half-hour bins).  A
//! `Period` is a bin index; all scheduling arithmetic happens on these
//! integers so window bookkeeping is exact.  The mapping back to a clock
//! time is held in `DayConfig`:
//!
//!   minutes_after_midnight = day_start_minutes + period * minutes_per_period
//!
//! The framework itself never needs clock times; they exist for labels in
//! logs and tour maps.

use std::fmt;

use crate::{AbmError, AbmResult};

// ── Period ───────────────────────────────────────────────────────────────────

/// A discretized time-of-day bin.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period(pub u16);

impl Period {
    pub const ZERO: Period = Period(0);

    /// Cast to `usize` for direct use as a per-period `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::ops::Sub for Period {
    type Output = u16;
    #[inline]
    fn sub(self, rhs: Period) -> u16 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ── DayConfig ─────────────────────────────────────────────────────────────────

/// How the day is discretized.
///
/// Typically built once by the application and shared by the alternative
/// table and every timetable of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayConfig {
    /// Number of bins in the day.  Valid periods are `0..periods`.
    pub periods: u16,

    /// Length of one bin in minutes.  Default: 30.
    pub minutes_per_period: u16,

    /// Clock time of period 0 in minutes after midnight (e.g. 300 = 05:00).
    pub day_start_minutes: u16,
}

impl Default for DayConfig {
    /// 48 half-hour bins starting at midnight.
    fn default() -> Self {
        Self { periods: 48, minutes_per_period: 30, day_start_minutes: 0 }
    }
}

impl DayConfig {
    /// Check the discretization is usable.
    pub fn validate(&self) -> AbmResult<()> {
        if self.periods == 0 {
            return Err(AbmError::Config("a day needs at least one period".into()));
        }
        if self.minutes_per_period == 0 {
            return Err(AbmError::Config("minutes_per_period must be > 0".into()));
        }
        Ok(())
    }

    /// `true` if `period` is a valid bin of this day.
    #[inline]
    pub fn contains(&self, period: Period) -> bool {
        period.0 < self.periods
    }

    /// Return `period` unchanged, or an error if it lies outside the day.
    pub fn check(&self, period: Period) -> AbmResult<Period> {
        if self.contains(period) {
            Ok(period)
        } else {
            Err(AbmError::PeriodOutOfDay { period, periods: self.periods })
        }
    }

    /// The last valid period of the day.
    #[inline]
    pub fn last_period(&self) -> Period {
        Period(self.periods.saturating_sub(1))
    }

    /// Clock time at the start of `period`, in minutes after midnight.
    /// Wraps past midnight for days that start late.
    pub fn start_minutes(&self, period: Period) -> u32 {
        let m = self.day_start_minutes as u32 + period.0 as u32 * self.minutes_per_period as u32;
        m % 1_440
    }

    /// `HH:MM` label for the start of `period`.
    pub fn label(&self, period: Period) -> String {
        let m = self.start_minutes(period);
        format!("{:02}:{:02}", m / 60, m % 60)
    }

    /// How many whole periods cover `minutes` (rounds up).
    #[inline]
    pub fn periods_for_minutes(&self, minutes: u32) -> u16 {
        minutes.div_ceil(self.minutes_per_period as u32) as u16
    }
}
