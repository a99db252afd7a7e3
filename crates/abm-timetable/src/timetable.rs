//! Per-unit time windows and the availability rule.
//!
//! A [`Timetable`] holds one [`Window`] per scheduling unit (usually a
//! person; a parent tour when scheduling subtours).  Each window records a
//! small flag set per period plus the list of committed tours, so the
//! availability check is a scan over at most `end - start + 1` bytes.
//!
//! # Period flags
//!
//! | Flag     | Set on                                        |
//! |----------|-----------------------------------------------|
//! | `START`  | first period of a tour with `start < end`     |
//! | `END`    | last period of a tour with `start < end`      |
//! | `MIDDLE` | every period strictly inside such a tour      |
//! | `POINT`  | the single period of a zero-duration tour     |
//!
//! A candidate `[s, e]` with `s < e` fits iff period `s` carries neither
//! `START` nor `MIDDLE`, period `e` carries neither `END` nor `MIDDLE`, and
//! every period strictly between them is empty.  A zero-duration candidate
//! at `p` fits iff `p` is not `MIDDLE`.  This is exactly the closed-interval
//! rule `a.end <= b.start || b.end <= a.start` from the crate docs.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use abm_core::{DayConfig, Period, PersonId, TddAltId, TourId};

use crate::{TddAlt, TddAlts, TimetableError, TimetableResult};

// ── WindowKey ─────────────────────────────────────────────────────────────────

/// A type that owns a window: `PersonId` for tours, `TourId` for subtours.
pub trait WindowKey: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn from_raw(raw: u32) -> Self;
    fn to_raw(self) -> u32;
}

impl WindowKey for PersonId {
    fn from_raw(raw: u32) -> Self {
        PersonId(raw)
    }
    fn to_raw(self) -> u32 {
        self.0
    }
}

impl WindowKey for TourId {
    fn from_raw(raw: u32) -> Self {
        TourId(raw)
    }
    fn to_raw(self) -> u32 {
        self.0
    }
}

// ── PeriodFlags ───────────────────────────────────────────────────────────────

/// Occupancy bits for one period of one window.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodFlags(u8);

impl PeriodFlags {
    pub const EMPTY:  PeriodFlags = PeriodFlags(0);
    pub const START:  PeriodFlags = PeriodFlags(1 << 0);
    pub const END:    PeriodFlags = PeriodFlags(1 << 1);
    pub const MIDDLE: PeriodFlags = PeriodFlags(1 << 2);
    pub const POINT:  PeriodFlags = PeriodFlags(1 << 3);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if any bit of `other` is set in `self`.
    #[inline]
    pub fn intersects(self, other: PeriodFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn contains(self, other: PeriodFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn union(self, other: PeriodFlags) -> PeriodFlags {
        PeriodFlags(self.0 | other.0)
    }
}

// ── CommittedTour ─────────────────────────────────────────────────────────────

/// A tour fixed into a window, with the span it occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommittedTour {
    pub tour:  TourId,
    pub tdd:   TddAltId,
    pub start: Period,
    pub end:   Period,
}

impl CommittedTour {
    #[inline]
    pub fn duration(&self) -> u16 {
        self.end - self.start
    }

    #[inline]
    fn overlaps(&self, start: Period, end: Period) -> bool {
        self.end > start && end > self.start
    }
}

/// What `commit` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The tour was added to the window.
    Committed,
    /// The same tour was already committed to the same alternative.
    AlreadyCommitted,
}

// ── Window ────────────────────────────────────────────────────────────────────

/// One unit's day: per-period flags and the tours that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    flags: Vec<PeriodFlags>,
    /// In commit order.
    tours: Vec<CommittedTour>,
}

impl Window {
    pub fn new(periods: u16) -> Self {
        Self { flags: vec![PeriodFlags::EMPTY; periods as usize], tours: Vec::new() }
    }

    pub fn periods(&self) -> u16 {
        self.flags.len() as u16
    }

    /// Flags at `period`; periods outside the day read as empty.
    pub fn flags(&self, period: Period) -> PeriodFlags {
        self.flags.get(period.index()).copied().unwrap_or_default()
    }

    pub fn is_free(&self, period: Period) -> bool {
        self.flags(period).is_empty()
    }

    pub fn tours(&self) -> &[CommittedTour] {
        &self.tours
    }

    /// The most recently committed tour.
    pub fn last_tour(&self) -> Option<&CommittedTour> {
        self.tours.last()
    }

    pub fn find_tour(&self, tour: TourId) -> Option<&CommittedTour> {
        self.tours.iter().find(|t| t.tour == tour)
    }

    /// Whether `[start, end]` fits alongside every committed tour.
    ///
    /// Spans reaching past the day never fit.
    pub fn is_available(&self, start: Period, end: Period) -> bool {
        if end < start || end.index() >= self.flags.len() {
            return false;
        }
        let (s, e) = (start.index(), end.index());
        if s == e {
            return !self.flags[s].intersects(PeriodFlags::MIDDLE);
        }
        if self.flags[s].intersects(PeriodFlags::START.union(PeriodFlags::MIDDLE)) {
            return false;
        }
        if self.flags[e].intersects(PeriodFlags::END.union(PeriodFlags::MIDDLE)) {
            return false;
        }
        self.flags[s + 1..e].iter().all(|f| f.is_empty())
    }

    /// Periods touched by any committed tour, ascending.
    pub fn occupied_periods(&self) -> Vec<Period> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_empty())
            .map(|(i, _)| Period(i as u16))
            .collect()
    }

    /// Length of the longest run of untouched periods.
    pub fn max_free_block(&self) -> u16 {
        let mut best = 0u16;
        let mut run = 0u16;
        for f in &self.flags {
            if f.is_empty() {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }

    /// Untouched periods immediately before `period` (not counting it).
    pub fn adjacent_free_before(&self, period: Period) -> u16 {
        let upto = period.index().min(self.flags.len());
        self.flags[..upto].iter().rev().take_while(|f| f.is_empty()).count() as u16
    }

    /// Untouched periods immediately after `period` (not counting it).
    pub fn adjacent_free_after(&self, period: Period) -> u16 {
        let from = (period.index() + 1).min(self.flags.len());
        self.flags[from..].iter().take_while(|f| f.is_empty()).count() as u16
    }

    fn mark(&mut self, tour: CommittedTour) {
        let (s, e) = (tour.start.index(), tour.end.index());
        if s == e {
            self.flags[s] = self.flags[s].union(PeriodFlags::POINT);
        } else {
            self.flags[s] = self.flags[s].union(PeriodFlags::START);
            self.flags[e] = self.flags[e].union(PeriodFlags::END);
            for f in &mut self.flags[s + 1..e] {
                *f = f.union(PeriodFlags::MIDDLE);
            }
        }
        self.tours.push(tour);
    }
}

// ── Timetable ─────────────────────────────────────────────────────────────────

/// Windows for every unit that has at least one committed tour (or was
/// registered up front with [`with_units`](Timetable::with_units)).
///
/// Units are kept in a `BTreeMap` so iteration, persistence, and tour maps
/// come out in a stable order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timetable<U: WindowKey> {
    periods: u16,
    windows: BTreeMap<U, Window>,
}

impl<U: WindowKey> Timetable<U> {
    pub fn new(periods: u16) -> Self {
        Self { periods, windows: BTreeMap::new() }
    }

    pub fn for_day(day: &DayConfig) -> Self {
        Self::new(day.periods)
    }

    /// Pre-create empty windows so that every unit shows up in tour maps and
    /// persisted output even before its first commit.
    pub fn with_units(periods: u16, units: impl IntoIterator<Item = U>) -> Self {
        let windows = units.into_iter().map(|u| (u, Window::new(periods))).collect();
        Self { periods, windows }
    }

    pub fn periods(&self) -> u16 {
        self.periods
    }

    pub fn unit_count(&self) -> usize {
        self.windows.len()
    }

    pub fn units(&self) -> impl Iterator<Item = U> + '_ {
        self.windows.keys().copied()
    }

    pub fn window(&self, unit: U) -> Option<&Window> {
        self.windows.get(&unit)
    }

    /// `(unit, window)` pairs in unit order.
    pub fn iter(&self) -> impl Iterator<Item = (U, &Window)> + '_ {
        self.windows.iter().map(|(u, w)| (*u, w))
    }

    /// Total committed tours across all windows.
    pub fn tour_count(&self) -> usize {
        self.windows.values().map(|w| w.tours.len()).sum()
    }

    /// Reject alternatives that reach past the day.
    pub fn check_alternative(&self, alt: &TddAlt) -> TimetableResult<()> {
        if alt.end.index() >= self.periods as usize {
            return Err(TimetableError::PeriodOutOfRange { id: alt.id, end: alt.end, periods: self.periods });
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Whether `alt` fits in `unit`'s window.  Units with no window are free.
    pub fn is_available(&self, unit: U, alt: &TddAlt) -> bool {
        match self.windows.get(&unit) {
            Some(w) => w.is_available(alt.start, alt.end),
            None => alt.start <= alt.end && alt.end.index() < self.periods as usize,
        }
    }

    /// Element-wise availability of `tdds[i]` for `units[i]`.
    ///
    /// This is the read-only filter applied to a round's chooser/alternative
    /// pairs before probabilities are drawn.
    pub fn filter_alternatives(
        &self,
        units: &[U],
        tdds: &[TddAltId],
        alts: &TddAlts,
    ) -> TimetableResult<Vec<bool>> {
        if units.len() != tdds.len() {
            return Err(TimetableError::LengthMismatch {
                what:     "alternative ids",
                expected: units.len(),
                got:      tdds.len(),
            });
        }
        units
            .iter()
            .zip(tdds)
            .map(|(&unit, &tdd)| Ok(self.is_available(unit, alts.require(tdd)?)))
            .collect()
    }

    /// Every alternative in `alts` that currently fits `unit`'s window, in
    /// table order.
    pub fn available_alternatives(&self, unit: U, alts: &TddAlts) -> Vec<TddAltId> {
        alts.iter().filter(|a| self.is_available(unit, a)).map(|a| a.id).collect()
    }

    /// Committed tours for `unit`, in commit order.
    pub fn tours(&self, unit: U) -> &[CommittedTour] {
        self.windows.get(&unit).map(|w| w.tours()).unwrap_or(&[])
    }

    /// The tour committed most recently for `unit`.
    pub fn previous_tour(&self, unit: U) -> Option<&CommittedTour> {
        self.windows.get(&unit).and_then(|w| w.last_tour())
    }

    /// `(start, end)` of the previous tour.
    pub fn previous_tour_window(&self, unit: U) -> Option<(Period, Period)> {
        self.previous_tour(unit).map(|t| (t.start, t.end))
    }

    /// Locate `tour` in any window.
    pub fn find_tour(&self, tour: TourId) -> Option<(U, &CommittedTour)> {
        self.windows.iter().find_map(|(u, w)| w.find_tour(tour).map(|t| (*u, t)))
    }

    pub fn occupied_periods(&self, unit: U) -> Vec<Period> {
        self.windows.get(&unit).map(|w| w.occupied_periods()).unwrap_or_default()
    }

    /// Longest free run in `unit`'s window; a unit with no window is free all
    /// day.
    pub fn max_free_block(&self, unit: U) -> u16 {
        self.windows.get(&unit).map_or(self.periods, |w| w.max_free_block())
    }

    pub fn adjacent_free_before(&self, unit: U, period: Period) -> u16 {
        match self.windows.get(&unit) {
            Some(w) => w.adjacent_free_before(period),
            None => period.0.min(self.periods),
        }
    }

    pub fn adjacent_free_after(&self, unit: U, period: Period) -> u16 {
        match self.windows.get(&unit) {
            Some(w) => w.adjacent_free_after(period),
            None => self.periods.saturating_sub(period.0 + 1),
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Fix `tour` into `unit`'s window at `alt`.
    ///
    /// Re-committing the same tour to the same alternative is a no-op.
    /// Committing it to a different alternative, or committing a span that
    /// overlaps another tour, is an error and leaves the window untouched.
    pub fn commit(&mut self, unit: U, tour: TourId, alt: &TddAlt) -> TimetableResult<CommitOutcome> {
        self.check_alternative(alt)?;
        if alt.end < alt.start {
            return Err(TimetableError::InvalidAlternative { id: alt.id, start: alt.start, end: alt.end });
        }
        let periods = self.periods;
        let window = self.windows.entry(unit).or_insert_with(|| Window::new(periods));

        if let Some(prev) = window.find_tour(tour) {
            if prev.tdd == alt.id {
                return Ok(CommitOutcome::AlreadyCommitted);
            }
            return Err(TimetableError::Reassigned {
                unit:      unit.to_string(),
                tour,
                committed: prev.tdd,
                requested: alt.id,
            });
        }

        if !window.is_available(alt.start, alt.end) {
            let existing = window
                .tours
                .iter()
                .find(|t| t.overlaps(alt.start, alt.end))
                .map_or(TourId::INVALID, |t| t.tour);
            return Err(TimetableError::Conflict {
                unit: unit.to_string(),
                tour,
                start: alt.start,
                end: alt.end,
                existing,
            });
        }

        window.mark(CommittedTour { tour, tdd: alt.id, start: alt.start, end: alt.end });
        Ok(CommitOutcome::Committed)
    }

    /// Commit a batch of `(unit, tour, alternative)` assignments in order.
    ///
    /// Stops at the first error; assignments before it stay committed.
    /// Returns the number of newly committed tours.
    pub fn commit_all<I>(&mut self, assignments: I, alts: &TddAlts) -> TimetableResult<usize>
    where
        I: IntoIterator<Item = (U, TourId, TddAltId)>,
    {
        let mut added = 0;
        for (unit, tour, tdd) in assignments {
            if self.commit(unit, tour, alts.require(tdd)?)? == CommitOutcome::Committed {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Replay every tour of `other` into `self`, unit by unit in commit order.
    ///
    /// Used to combine windows built by separate steps (outbound before
    /// inbound, say).  The same conflict rules apply, so overlaying two
    /// incompatible timetables fails at the first clash.
    pub fn overlay(&mut self, other: &Timetable<U>) -> TimetableResult<usize> {
        if other.periods != self.periods {
            return Err(TimetableError::LengthMismatch {
                what:     "timetable periods",
                expected: self.periods as usize,
                got:      other.periods as usize,
            });
        }
        let mut added = 0;
        for (unit, window) in &other.windows {
            for t in &window.tours {
                let alt = TddAlt::new(t.tdd, t.start, t.end);
                if self.commit(*unit, t.tour, &alt)? == CommitOutcome::Committed {
                    added += 1;
                }
            }
        }
        tracing::debug!(added, units = other.windows.len(), "overlaid timetable");
        Ok(added)
    }
}
