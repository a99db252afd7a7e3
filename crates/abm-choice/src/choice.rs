//! Single-choice kernel: one alternative column per chooser row.
//!
//! # Algorithm
//!
//! For each row, walk the columns left to right subtracting each weight from
//! the row's draw; the first column where the running value reaches `<= 0`
//! is chosen.  This is inverse-CDF sampling without materializing the
//! cumulative sum, and column order doubles as the tie-break order: a draw
//! landing exactly on a cumulative boundary selects the earlier column.
//!
//! # Residual fallback
//!
//! If no column stops the walk (the row sums to slightly under 1 and the
//! draw landed in the gap, or the inputs are malformed) the row falls back
//! to its maximum-weight column, first-seen max winning ties.  Every row
//! therefore yields a valid column; the fallback rows are reported.

use crate::{ChoiceError, ChoiceResult, Matrix};

/// Result of [`make_choices`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceOutcome {
    /// Chosen column per chooser row.
    pub columns: Vec<usize>,
    /// Rows resolved by the residual fallback, ascending.
    pub residual_rows: Vec<usize>,
}

impl ChoiceOutcome {
    /// Number of rows that needed the residual fallback.
    #[inline]
    pub fn residual_count(&self) -> usize {
        self.residual_rows.len()
    }
}

/// Choose one column per row of `probs` using one uniform draw per row.
///
/// Rows need not sum exactly to 1.  Fails only on malformed shapes: a draw
/// count different from the row count, or rows without any column.
pub fn make_choices(probs: &Matrix, draws: &[f64]) -> ChoiceResult<ChoiceOutcome> {
    let (rows, cols) = probs.shape();
    if draws.len() != rows {
        return Err(ChoiceError::ShapeMismatch { what: "draws", expected: rows, got: draws.len() });
    }
    if rows == 0 {
        return Ok(ChoiceOutcome::default());
    }
    if cols == 0 {
        return Err(ChoiceError::NoAlternatives { rows });
    }

    #[cfg(not(feature = "parallel"))]
    let picks: Vec<(usize, bool)> = probs
        .iter_rows()
        .zip(draws)
        .map(|(row, &draw)| choose_row(row, draw))
        .collect();

    #[cfg(feature = "parallel")]
    let picks: Vec<(usize, bool)> = {
        use rayon::prelude::*;
        probs
            .as_slice()
            .par_chunks(cols)
            .zip(draws.par_iter())
            .map(|(row, &draw)| choose_row(row, draw))
            .collect()
    };

    let mut outcome = ChoiceOutcome { columns: Vec::with_capacity(rows), residual_rows: Vec::new() };
    for (row, (col, residual)) in picks.into_iter().enumerate() {
        outcome.columns.push(col);
        if residual {
            outcome.residual_rows.push(row);
        }
    }

    if !outcome.residual_rows.is_empty() {
        tracing::debug!(
            rows = outcome.residual_rows.len(),
            choosers = rows,
            "make_choices fell back to max-weight alternative"
        );
    }
    Ok(outcome)
}

/// Choose a column of one row.  Returns `(column, used_fallback)`.
///
/// `weights` must be non-empty; [`make_choices`] rejects empty rows first.
pub(crate) fn choose_row(weights: &[f64], draw: f64) -> (usize, bool) {
    let mut z = draw;
    for (col, &w) in weights.iter().enumerate() {
        z -= w;
        if z <= 0.0 {
            return (col, false);
        }
    }
    (first_max(weights), true)
}

/// Index of the largest weight; the earliest one wins ties.
fn first_max(weights: &[f64]) -> usize {
    let mut best = 0;
    let mut max = weights[0];
    for (col, &w) in weights.iter().enumerate().skip(1) {
        if w > max {
            best = col;
            max = w;
        }
    }
    best
}
