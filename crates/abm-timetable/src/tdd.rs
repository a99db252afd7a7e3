//! The time-of-day alternative table (`tdd_alts`).
//!
//! Every tour chooses one row of this table: a departure period, an arrival
//! period, and the implied duration.  The table is built once per run and
//! shared read-only by every scheduling step.

use abm_core::{DayConfig, Period, TddAltId};

use crate::{TimetableError, TimetableResult};

// ── TddAlt ────────────────────────────────────────────────────────────────────

/// One start/end alternative.  `end` is the last active period, inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TddAlt {
    pub id:    TddAltId,
    pub start: Period,
    pub end:   Period,
}

impl TddAlt {
    pub fn new(id: TddAltId, start: Period, end: Period) -> Self {
        Self { id, start, end }
    }

    /// `end - start`, in periods.
    #[inline]
    pub fn duration(&self) -> u16 {
        self.end - self.start
    }

    #[inline]
    pub fn is_zero_duration(&self) -> bool {
        self.start == self.end
    }

    /// `true` if the two spans cannot share a window (see the crate docs for
    /// the boundary convention).
    #[inline]
    pub fn overlaps(&self, start: Period, end: Period) -> bool {
        self.end > start && end > self.start
    }

    /// `true` if this span lies inside `[start, end]`.
    #[inline]
    pub fn within(&self, start: Period, end: Period) -> bool {
        self.start >= start && self.end <= end
    }
}

// ── TddAlts ───────────────────────────────────────────────────────────────────

/// The alternative table, sorted by id.
///
/// Ids are external and need not be contiguous; lookups are binary searches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TddAlts {
    alts: Vec<TddAlt>,
}

impl TddAlts {
    /// Build a table, sorting by id and rejecting duplicates and spans that
    /// end before they start.
    pub fn new(mut alts: Vec<TddAlt>) -> TimetableResult<Self> {
        if let Some(bad) = alts.iter().find(|a| a.end < a.start) {
            return Err(TimetableError::InvalidAlternative { id: bad.id, start: bad.start, end: bad.end });
        }
        alts.sort_unstable_by_key(|a| a.id);
        if let Some(pair) = alts.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(TimetableError::DuplicateAlternative(pair[0].id));
        }
        Ok(Self { alts })
    }

    /// Number the `(start, end)` spans consecutively from `first_id`.
    pub fn from_spans(first_id: u32, spans: &[(u16, u16)]) -> TimetableResult<Self> {
        let alts = spans
            .iter()
            .enumerate()
            .map(|(i, &(s, e))| TddAlt::new(TddAltId(first_id + i as u32), Period(s), Period(e)))
            .collect();
        Self::new(alts)
    }

    /// The standard table: every `start <= end` pair of the day, ordered by
    /// start then end, numbered from `first_id`.
    pub fn all_spans(day: &DayConfig, first_id: u32) -> Self {
        let mut alts = Vec::with_capacity(day.periods as usize * (day.periods as usize + 1) / 2);
        for s in 0..day.periods {
            for e in s..day.periods {
                let id = TddAltId(first_id + alts.len() as u32);
                alts.push(TddAlt::new(id, Period(s), Period(e)));
            }
        }
        Self { alts }
    }

    pub fn len(&self) -> usize {
        self.alts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alts.is_empty()
    }

    /// All alternatives, sorted by id.
    pub fn as_slice(&self) -> &[TddAlt] {
        &self.alts
    }

    pub fn iter(&self) -> impl Iterator<Item = &TddAlt> + '_ {
        self.alts.iter()
    }

    pub fn ids(&self) -> Vec<TddAltId> {
        self.alts.iter().map(|a| a.id).collect()
    }

    /// Position of `id` in [`as_slice`](Self::as_slice).
    pub fn index_of(&self, id: TddAltId) -> Option<usize> {
        self.alts.binary_search_by_key(&id, |a| a.id).ok()
    }

    pub fn get(&self, id: TddAltId) -> Option<&TddAlt> {
        self.index_of(id).map(|i| &self.alts[i])
    }

    /// Like [`get`](Self::get) but an unknown id is an error.
    pub fn require(&self, id: TddAltId) -> TimetableResult<&TddAlt> {
        self.get(id).ok_or(TimetableError::UnknownAlternative(id))
    }

    /// Ids of alternatives nested inside `[start, end]`.
    pub fn within(&self, start: Period, end: Period) -> Vec<TddAltId> {
        self.alts.iter().filter(|a| a.within(start, end)).map(|a| a.id).collect()
    }

    /// The latest end period in the table.
    pub fn max_end(&self) -> Option<Period> {
        self.alts.iter().map(|a| a.end).max()
    }
}
