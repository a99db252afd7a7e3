//! Tour and chooser records.

use rustc_hash::FxHashMap;

use abm_core::{Period, PersonId, PurposeId, TddAltId, TourId};
use abm_timetable::TddAlts;

use crate::SchedulingResult;

// ── Tour ──────────────────────────────────────────────────────────────────────

/// One tour to schedule.
///
/// `tour_num` orders a person's tours (its position in the day's chain);
/// ties are broken by `id`.  `parent` is set for at-work subtours.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    pub id:       TourId,
    pub person:   PersonId,
    pub tour_num: u16,
    pub purpose:  PurposeId,
    pub parent:   Option<TourId>,
}

impl Tour {
    pub fn new(id: TourId, person: PersonId, tour_num: u16, purpose: PurposeId) -> Self {
        Self { id, person, tour_num, purpose, parent: None }
    }

    /// Mark this tour as a subtour of `parent`.
    pub fn with_parent(mut self, parent: TourId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_subtour(&self) -> bool {
        self.parent.is_some()
    }
}

// ── Chooser ───────────────────────────────────────────────────────────────────

/// One row of a scheduling round, as seen by a probability provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chooser {
    pub tour:     TourId,
    pub person:   PersonId,
    pub tour_num: u16,
    pub purpose:  PurposeId,
    /// `(start, end)` of the unit's most recently committed tour.
    pub previous: Option<(Period, Period)>,
    /// The parent tour's span, for subtours.
    pub bounds:   Option<(Period, Period)>,
}

impl Chooser {
    pub fn for_tour(tour: &Tour) -> Self {
        Self {
            tour:     tour.id,
            person:   tour.person,
            tour_num: tour.tour_num,
            purpose:  tour.purpose,
            previous: None,
            bounds:   None,
        }
    }

    /// Periods between the previous tour's end and `start`, or `None` for a
    /// first tour.
    pub fn gap_after_previous(&self, start: Period) -> Option<i32> {
        self.previous.map(|(_, end)| start.0 as i32 - end.0 as i32)
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

/// A scheduled tour: the chosen alternative and its span.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub tour:   TourId,
    pub person: PersonId,
    pub tdd:    TddAltId,
    pub start:  Period,
    pub end:    Period,
    /// Zero-based round the tour was scheduled in.
    pub round:  u32,
}

impl Assignment {
    pub fn duration(&self) -> u16 {
        self.end - self.start
    }
}

// ── Previous-tour attributes ──────────────────────────────────────────────────

/// For each tour, the `(start, end)` of the same person's previous tour,
/// looked up from `previous_tdd_by_person` in the alternative table.
///
/// Persons with no entry get `None`.  An entry naming an alternative that is
/// not in `alts` is an error.
pub fn previous_tour_attributes(
    tours: &[Tour],
    previous_tdd_by_person: &FxHashMap<PersonId, TddAltId>,
    alts: &TddAlts,
) -> SchedulingResult<Vec<Option<(Period, Period)>>> {
    tours
        .iter()
        .map(|t| match previous_tdd_by_person.get(&t.person) {
            None => Ok(None),
            Some(&tdd) => {
                let alt = alts.require(tdd)?;
                Ok(Some((alt.start, alt.end)))
            }
        })
        .collect()
}
