//! The round loop.
//!
//! # Round phases
//!
//! ```text
//! for each round k (the k-th tour of every unit):
//!   1. Filter         per chooser, alternatives that fit its unit's window
//!   2. Probabilities  provider rows over each chooser's candidates
//!   3. Draw           one keyed uniform per chooser, make_choices
//!   4. Commit         write every choice into the timetable
//! ```
//!
//! Each chooser's matrix row lists only its own candidates, padded with
//! zero weight on the right.  A walk still running when it reaches the
//! padding has a positive remainder that zero weights cannot exhaust, and
//! the fallback keeps the first maximum, so padding is never chosen.
//!
//! A unit contributes at most one chooser per round, so commits within a
//! round never compete for the same window.

use rustc_hash::{FxHashMap, FxHashSet};

use abm_choice::{Matrix, make_choices};
use abm_core::{DayConfig, DrawKey, DrawStream, Period, PersonId, TourId};
use abm_timetable::{TddAlt, TddAlts, Timetable, WindowKey};

use crate::{
    Assignment, Chooser, DrawSource, ProbabilityProvider, RoundContext, RoundSummary,
    SchedulerConfig, SchedulingError, SchedulingObserver, SchedulingResult, Step, Tour,
};

/// Schedules tours against a person timetable it owns.
///
/// Construct with [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct TourScheduler<P, D = DrawStream> {
    pub(crate) config:    SchedulerConfig,
    pub(crate) day:       DayConfig,
    pub(crate) alts:      TddAlts,
    pub(crate) timetable: Timetable<PersonId>,
    pub(crate) provider:  P,
    pub(crate) draws:     D,
}

impl<P: ProbabilityProvider, D: DrawSource> TourScheduler<P, D> {
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn day(&self) -> &DayConfig {
        &self.day
    }

    pub fn alts(&self) -> &TddAlts {
        &self.alts
    }

    /// Current person windows.
    pub fn timetable(&self) -> &Timetable<PersonId> {
        &self.timetable
    }

    /// Consume the scheduler, keeping the windows for a later step.
    pub fn into_timetable(self) -> Timetable<PersonId> {
        self.timetable
    }

    /// Schedule person-level tours.
    ///
    /// Tours of one person are visited in `(tour_num, id)` order, one per
    /// round; choices are committed into the person timetable, on top of
    /// whatever earlier steps left there.
    pub fn schedule_tours<O: SchedulingObserver>(
        &mut self,
        tours:    &[Tour],
        observer: &mut O,
    ) -> SchedulingResult<Vec<Assignment>> {
        let units: Vec<(PersonId, Option<(Period, Period)>)> =
            tours.iter().map(|t| (t.person, None)).collect();
        let engine = RoundEngine {
            config:   &self.config,
            day:      &self.day,
            alts:     &self.alts,
            provider: &self.provider,
            draws:    &self.draws,
        };
        engine.run(Step::Tours, tours, &units, &mut self.timetable, observer)
    }

    /// Schedule at-work subtours inside their parents' committed spans.
    ///
    /// `parents` are the assignments of the parent tours.  Each parent gets
    /// a fresh window of its own, so subtours of one parent never overlap
    /// each other; the person timetable is left untouched.  Returns the
    /// subtour assignments.
    pub fn schedule_subtours<O: SchedulingObserver>(
        &mut self,
        parents:  &[Assignment],
        subtours: &[Tour],
        observer: &mut O,
    ) -> SchedulingResult<Vec<Assignment>> {
        let spans: FxHashMap<TourId, (Period, Period)> =
            parents.iter().map(|a| (a.tour, (a.start, a.end))).collect();

        let units = subtours
            .iter()
            .map(|t| {
                let parent = t
                    .parent
                    .ok_or(SchedulingError::MissingParent { tour: t.id, parent: TourId::INVALID })?;
                let span = spans
                    .get(&parent)
                    .copied()
                    .ok_or(SchedulingError::MissingParent { tour: t.id, parent })?;
                Ok((parent, Some(span)))
            })
            .collect::<SchedulingResult<Vec<(TourId, Option<(Period, Period)>)>>>()?;

        let mut windows: Timetable<TourId> = Timetable::for_day(&self.day);
        let engine = RoundEngine {
            config:   &self.config,
            day:      &self.day,
            alts:     &self.alts,
            provider: &self.provider,
            draws:    &self.draws,
        };
        engine.run(Step::Subtours, subtours, &units, &mut windows, observer)
    }
}

// ── RoundEngine ───────────────────────────────────────────────────────────────

/// The read-only half of a scheduler, split off so the timetable can be
/// borrowed mutably alongside it.
struct RoundEngine<'a, P, D> {
    config:   &'a SchedulerConfig,
    day:      &'a DayConfig,
    alts:     &'a TddAlts,
    provider: &'a P,
    draws:    &'a D,
}

impl<P: ProbabilityProvider, D: DrawSource> RoundEngine<'_, P, D> {
    /// `units[i]` is the window owner of `tours[i]` and, for subtours, the
    /// span every candidate must lie inside.
    fn run<U: WindowKey, O: SchedulingObserver>(
        &self,
        step:      Step,
        tours:     &[Tour],
        units:     &[(U, Option<(Period, Period)>)],
        timetable: &mut Timetable<U>,
        observer:  &mut O,
    ) -> SchedulingResult<Vec<Assignment>> {
        let mut seen = FxHashSet::default();
        if let Some(dup) = tours.iter().find(|t| !seen.insert(t.id)) {
            return Err(SchedulingError::DuplicateTour(dup.id));
        }

        let rounds = plan_rounds(tours, units);
        tracing::info!(%step, tours = tours.len(), rounds = rounds.len(), "scheduling step start");
        observer.on_step_start(step, tours.len());

        let mut assignments = Vec::with_capacity(tours.len());
        let mut residuals = 0usize;

        for (round, members) in rounds.iter().enumerate() {
            let round = round as u32;
            observer.on_round_start(step, round, members.len());

            // ── Phase 1: filter ───────────────────────────────────────────
            let choosers: Vec<Chooser> = members
                .iter()
                .map(|&i| {
                    let (unit, bounds) = units[i];
                    Chooser {
                        previous: timetable.previous_tour_window(unit),
                        bounds,
                        ..Chooser::for_tour(&tours[i])
                    }
                })
                .collect();
            let candidates = self.candidates(&choosers, members, units, timetable);
            if let Some(c) = choosers.iter().zip(&candidates).find(|(_, alts)| alts.is_empty()) {
                return Err(SchedulingError::NoFeasibleAlternative { tour: c.0.tour, person: c.0.person });
            }

            // ── Phase 2: probabilities ────────────────────────────────────
            let ctx = RoundContext { step, round, day: self.day, alts: self.alts };
            let rows = self.provider.probabilities(&ctx, &choosers, &candidates)?;
            let probs = self.compact(&choosers, &candidates, rows)?;

            // ── Phase 3: draw ─────────────────────────────────────────────
            let draws: Vec<f64> = choosers
                .iter()
                .map(|c| self.draws.uniform(DrawKey::new(c.tour.raw(), round, 0)))
                .collect();
            let outcome = make_choices(&probs, &draws)?;

            // ── Phase 4: commit ───────────────────────────────────────────
            for (r, &col) in outcome.columns.iter().enumerate() {
                let chooser = &choosers[r];
                let alt = candidates[r].get(col).copied().ok_or(SchedulingError::ProviderShape {
                    tour:     chooser.tour,
                    expected: candidates[r].len(),
                    got:      col + 1,
                })?;
                timetable.commit(units[members[r]].0, chooser.tour, &alt)?;
                observer.on_choice(chooser, &alt);
                assignments.push(Assignment {
                    tour:   chooser.tour,
                    person: chooser.person,
                    tdd:    alt.id,
                    start:  alt.start,
                    end:    alt.end,
                    round,
                });
            }

            let total: usize = candidates.iter().map(Vec::len).sum();
            let summary = RoundSummary {
                step,
                round,
                choosers: choosers.len(),
                residuals: outcome.residual_count(),
                mean_candidates: total as f64 / choosers.len().max(1) as f64,
            };
            residuals += summary.residuals;
            tracing::debug!(
                %step,
                round,
                choosers = summary.choosers,
                residuals = summary.residuals,
                mean_candidates = summary.mean_candidates,
                "round committed"
            );
            observer.on_round_end(&summary);
        }

        if residuals > 0 {
            tracing::warn!(%step, residuals, "choice draws fell back to the max-weight alternative");
        }
        tracing::info!(%step, scheduled = assignments.len(), "scheduling step done");
        observer.on_step_end(step, assignments.len());
        Ok(assignments)
    }

    /// Feasible alternatives per chooser, in table order.
    fn candidates<U: WindowKey>(
        &self,
        choosers:  &[Chooser],
        members:   &[usize],
        units:     &[(U, Option<(Period, Period)>)],
        timetable: &Timetable<U>,
    ) -> Vec<Vec<TddAlt>> {
        let alts = self.alts;

        #[cfg(not(feature = "parallel"))]
        let candidates = choosers
            .iter()
            .zip(members)
            .map(|(c, &i)| feasible(alts, timetable, units[i].0, c.bounds))
            .collect();

        #[cfg(feature = "parallel")]
        let candidates = {
            use rayon::prelude::*;
            choosers
                .par_iter()
                .zip(members.par_iter())
                .map(|(c, &i)| feasible(alts, timetable, units[i].0, c.bounds))
                .collect()
        };

        candidates
    }

    /// Check provider rows against the candidates and lay them out as one
    /// zero-padded matrix.
    fn compact(
        &self,
        choosers:   &[Chooser],
        candidates: &[Vec<TddAlt>],
        mut rows:   Vec<Vec<f64>>,
    ) -> SchedulingResult<Matrix> {
        if rows.len() != choosers.len() {
            return Err(SchedulingError::ProviderShape {
                tour:     TourId::INVALID,
                expected: choosers.len(),
                got:      rows.len(),
            });
        }
        let width = candidates.iter().map(Vec::len).max().unwrap_or(0);
        let mut probs = Matrix::zeros(rows.len(), width);

        for (r, row) in rows.iter_mut().enumerate() {
            if row.len() != candidates[r].len() {
                return Err(SchedulingError::ProviderShape {
                    tour:     choosers[r].tour,
                    expected: candidates[r].len(),
                    got:      row.len(),
                });
            }
            if self.config.renormalize {
                let sum: f64 = row.iter().sum();
                if sum > 0.0 && sum.is_finite() {
                    row.iter_mut().for_each(|p| *p /= sum);
                }
            }
            probs.row_mut(r)[..row.len()].copy_from_slice(row);
        }
        Ok(probs)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Group tour indices into rounds: round `k` holds the `k`-th tour of every
/// unit, each round ordered by `(unit, tour_num, id)`.
fn plan_rounds<U: WindowKey>(tours: &[Tour], units: &[(U, Option<(Period, Period)>)]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..tours.len()).collect();
    order.sort_by_key(|&i| (units[i].0, tours[i].tour_num, tours[i].id));

    let mut rounds: Vec<Vec<usize>> = Vec::new();
    let mut prev: Option<U> = None;
    let mut rank = 0usize;
    for i in order {
        let unit = units[i].0;
        rank = if prev == Some(unit) { rank + 1 } else { 0 };
        prev = Some(unit);
        if rounds.len() <= rank {
            rounds.push(Vec::new());
        }
        rounds[rank].push(i);
    }
    rounds
}

fn feasible<U: WindowKey>(
    alts:      &TddAlts,
    timetable: &Timetable<U>,
    unit:      U,
    bounds:    Option<(Period, Period)>,
) -> Vec<TddAlt> {
    alts.iter()
        .filter(|a| bounds.is_none_or(|(s, e)| a.within(s, e)))
        .filter(|a| timetable.is_available(unit, a))
        .copied()
        .collect()
}
