use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChoiceError {
    #[error("{what} has {got} entries, expected {expected}")]
    ShapeMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("{rows} chooser rows but no alternative columns")]
    NoAlternatives { rows: usize },

    #[error("row {row} has no available alternative")]
    NoAvailableAlternative { row: usize },

    #[error("utility at row {row}, column {col} is not a finite number or -inf")]
    InvalidUtility { row: usize, col: usize },
}

pub type ChoiceResult<T> = Result<T, ChoiceError>;
