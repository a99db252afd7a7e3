use abm_core::{Period, TddAltId, TourId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("alternative {0} is not in the tdd table")]
    UnknownAlternative(TddAltId),

    #[error("alternative {id} ends at {end} before it starts at {start}")]
    InvalidAlternative { id: TddAltId, start: Period, end: Period },

    #[error("alternative {0} appears more than once in the tdd table")]
    DuplicateAlternative(TddAltId),

    #[error("alternative {id} ends at {end}, outside a day of {periods} periods")]
    PeriodOutOfRange { id: TddAltId, end: Period, periods: u16 },

    #[error("{what} length {got} does not match {expected}")]
    LengthMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    /// An unavailable alternative reached `commit`; the filtering step upstream
    /// let it through.
    #[error("{tour} at {start}-{end} overlaps {existing} in the window of {unit}")]
    Conflict {
        unit:     String,
        tour:     TourId,
        start:    Period,
        end:      Period,
        existing: TourId,
    },

    #[error("{tour} is already committed to {committed} in the window of {unit}, cannot reassign to {requested}")]
    Reassigned {
        unit:      String,
        tour:      TourId,
        committed: TddAltId,
        requested: TddAltId,
    },

    #[error("timetable parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TimetableResult<T> = Result<T, TimetableError>;
