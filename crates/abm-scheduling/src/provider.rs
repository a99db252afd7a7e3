//! Probability providers: the seam where utility models plug in.

use abm_choice::{Matrix, utils_to_probs};
use abm_timetable::TddAlt;

use crate::{Chooser, RoundContext, SchedulingResult};

/// Computes choice probabilities for one round.
///
/// `candidates[i]` holds the alternatives still feasible for
/// `choosers[i]`, in table order.  The returned rows must line up with them
/// one to one: `probs[i].len() == candidates[i].len()`.  Rows need not sum
/// exactly to 1.
///
/// Implementations must be deterministic; the scheduler supplies the
/// randomness.
pub trait ProbabilityProvider {
    fn probabilities(
        &self,
        ctx:        &RoundContext<'_>,
        choosers:   &[Chooser],
        candidates: &[Vec<TddAlt>],
    ) -> SchedulingResult<Vec<Vec<f64>>>;
}

/// Multinomial logit over a utility function.
///
/// `utility(chooser, alt)` is evaluated for every candidate; the rows are
/// turned into probabilities with [`utils_to_probs`].  Returning
/// `f64::NEG_INFINITY` makes a candidate unavailable.
pub struct LogitProvider<F> {
    utility: F,
}

impl<F> LogitProvider<F>
where
    F: Fn(&Chooser, &TddAlt) -> f64,
{
    pub fn new(utility: F) -> Self {
        Self { utility }
    }
}

impl<F> ProbabilityProvider for LogitProvider<F>
where
    F: Fn(&Chooser, &TddAlt) -> f64,
{
    fn probabilities(
        &self,
        _ctx:       &RoundContext<'_>,
        choosers:   &[Chooser],
        candidates: &[Vec<TddAlt>],
    ) -> SchedulingResult<Vec<Vec<f64>>> {
        let width = candidates.iter().map(Vec::len).max().unwrap_or(0);
        // Ragged rows are padded with -inf so the padding gets zero weight.
        let mut utils = Matrix::filled(choosers.len(), width, f64::NEG_INFINITY);
        for (r, (chooser, alts)) in choosers.iter().zip(candidates).enumerate() {
            for (c, alt) in alts.iter().enumerate() {
                utils.set(r, c, (self.utility)(chooser, alt));
            }
        }
        let probs = utils_to_probs(&utils)?;
        Ok(candidates
            .iter()
            .enumerate()
            .map(|(r, alts)| probs.row(r)[..alts.len()].to_vec())
            .collect())
    }
}
