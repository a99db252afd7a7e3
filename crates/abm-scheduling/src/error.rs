use abm_choice::ChoiceError;
use abm_core::{AbmError, PersonId, TourId};
use abm_timetable::TimetableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("choice kernel error: {0}")]
    Choice(#[from] ChoiceError),

    #[error("timetable error: {0}")]
    Timetable(#[from] TimetableError),

    #[error("configuration error: {0}")]
    Core(#[from] AbmError),

    #[error("scheduler configuration error: {0}")]
    Config(String),

    /// The provider returned a row that does not line up with the chooser's
    /// candidate alternatives.
    #[error("provider returned {got} probabilities for {tour}, expected {expected}")]
    ProviderShape { tour: TourId, expected: usize, got: usize },

    #[error("no alternative fits the window of {person} for {tour}")]
    NoFeasibleAlternative { tour: TourId, person: PersonId },

    #[error("subtour {tour} has no committed parent window (parent {parent})")]
    MissingParent { tour: TourId, parent: TourId },

    #[error("{0} appears more than once in the tour table")]
    DuplicateTour(TourId),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
