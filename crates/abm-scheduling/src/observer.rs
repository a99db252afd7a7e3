//! Scheduler observer trait for progress reporting and diagnostics.

use abm_timetable::TddAlt;

use crate::{Chooser, Step};

/// Per-round counters passed to [`SchedulingObserver::on_round_end`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSummary {
    pub step:      Step,
    pub round:     u32,
    pub choosers:  usize,
    /// Rows where the choice kernel fell back to the max-weight column.
    pub residuals: usize,
    /// Mean number of feasible alternatives per chooser.
    pub mean_candidates: f64,
}

/// Callbacks invoked by [`TourScheduler`][crate::TourScheduler] while it
/// schedules.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SchedulingObserver {
    /// Called once before the first round of a step.
    fn on_step_start(&mut self, _step: Step, _tours: usize) {}

    /// Called before candidates are filtered for a round.
    fn on_round_start(&mut self, _step: Step, _round: u32, _choosers: usize) {}

    /// Called after each tour's choice is committed.
    fn on_choice(&mut self, _chooser: &Chooser, _alt: &TddAlt) {}

    fn on_round_end(&mut self, _summary: &RoundSummary) {}

    /// Called once after the last round of a step.
    fn on_step_end(&mut self, _step: Step, _scheduled: usize) {}
}

/// A [`SchedulingObserver`] that does nothing.
pub struct NoopObserver;

impl SchedulingObserver for NoopObserver {}

/// Collects every [`RoundSummary`] and running totals.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundStats {
    pub rounds:    Vec<RoundSummary>,
    pub choices:   usize,
    pub residuals: usize,
}

impl RoundStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }
}

impl SchedulingObserver for RoundStats {
    fn on_choice(&mut self, _chooser: &Chooser, _alt: &TddAlt) {
        self.choices += 1;
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        self.residuals += summary.residuals;
        self.rounds.push(*summary);
    }
}
