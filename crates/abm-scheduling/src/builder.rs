//! Fluent builder for constructing a [`TourScheduler`].

use abm_core::{DayConfig, DrawStream, PersonId};
use abm_timetable::{TddAlts, Timetable, TimetableError};

use crate::{DrawSource, ProbabilityProvider, SchedulerConfig, SchedulingError, SchedulingResult, TourScheduler};

/// Fluent builder for [`TourScheduler<P, D>`].
///
/// # Required inputs
///
/// - [`SchedulerConfig`] (seed, channel, renormalization)
/// - [`DayConfig`] (the discretization)
/// - [`TddAlts`] (the alternative table)
/// - `P: ProbabilityProvider`
///
/// # Optional inputs
///
/// | Method            | Default                                   |
/// |-------------------|-------------------------------------------|
/// | `.timetable(t)`   | empty windows for every person            |
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = SchedulerBuilder::new(config, day, alts, provider)
///     .timetable(windows_from_previous_step)
///     .build()?;
/// let assigned = scheduler.schedule_tours(&tours, &mut NoopObserver)?;
/// ```
pub struct SchedulerBuilder<P> {
    config:    SchedulerConfig,
    day:       DayConfig,
    alts:      TddAlts,
    provider:  P,
    timetable: Option<Timetable<PersonId>>,
}

impl<P: ProbabilityProvider> SchedulerBuilder<P> {
    pub fn new(config: SchedulerConfig, day: DayConfig, alts: TddAlts, provider: P) -> Self {
        Self { config, day, alts, provider, timetable: None }
    }

    /// Start from windows produced by an earlier step.
    pub fn timetable(mut self, timetable: Timetable<PersonId>) -> Self {
        self.timetable = Some(timetable);
        self
    }

    /// Build with keyed draws from `seed` on `channel`.
    pub fn build(self) -> SchedulingResult<TourScheduler<P, DrawStream>> {
        let draws = DrawStream::new(self.config.seed).channel(self.config.channel);
        self.build_with_draws(draws)
    }

    /// Build with a custom draw source.
    pub fn build_with_draws<D: DrawSource>(self, draws: D) -> SchedulingResult<TourScheduler<P, D>> {
        self.day.validate()?;

        if self.alts.is_empty() {
            return Err(SchedulingError::Config("alternative table is empty".into()));
        }
        if let Some(a) = self.alts.iter().find(|a| a.end.index() >= self.day.periods as usize) {
            return Err(TimetableError::PeriodOutOfRange { id: a.id, end: a.end, periods: self.day.periods }.into());
        }

        let timetable = match self.timetable {
            Some(t) if t.periods() != self.day.periods => {
                return Err(TimetableError::LengthMismatch {
                    what:     "timetable periods",
                    expected: self.day.periods as usize,
                    got:      t.periods() as usize,
                }
                .into());
            }
            Some(t) => t,
            None => Timetable::for_day(&self.day),
        };

        tracing::debug!(
            seed = self.config.seed,
            channel = self.config.channel,
            alternatives = self.alts.len(),
            periods = self.day.periods,
            "scheduler built"
        );

        Ok(TourScheduler {
            config: self.config,
            day: self.day,
            alts: self.alts,
            timetable,
            provider: self.provider,
            draws,
        })
    }
}
