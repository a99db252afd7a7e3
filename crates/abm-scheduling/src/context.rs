//! Read-only state handed to a probability provider each round.

use std::fmt;

use abm_core::DayConfig;
use abm_timetable::TddAlts;

/// Which scheduling step a round belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// Person-level tours against the person timetable.
    Tours,
    /// At-work subtours inside their parent tour's window.
    Subtours,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Tours => f.write_str("tours"),
            Step::Subtours => f.write_str("subtours"),
        }
    }
}

/// Everything a provider may read while computing one round's
/// probabilities.  Borrowed for the duration of the call only.
#[derive(Copy, Clone, Debug)]
pub struct RoundContext<'a> {
    pub step:  Step,
    /// Zero-based round within the step.
    pub round: u32,
    pub day:   &'a DayConfig,
    pub alts:  &'a TddAlts,
}
