//! Sampling with replacement: `n_samples` alternatives per chooser.
//!
//! Used to pre-sample a destination (or any large) choice set before the
//! expensive utility evaluation.
//!
//! # Algorithm
//!
//! Each chooser's draws are sorted ascending, then merged against the
//! cumulative-weight staircase of its row: walking the columns, every draw
//! below the running cumulative weight `z` is assigned the current column.
//! That is O(alternatives + samples) per chooser rather than
//! O(alternatives × samples).
//!
//! # Output order
//!
//! Slots follow the *sorted* draw order, so a chooser's picks come out in
//! ascending column order.  [`Pick::draw`] records which of the caller's
//! draws filled each slot for callers that need the original order.
//!
//! # Residual fallback
//!
//! Draws still unfilled after the last column (row sum just under 1) take
//! the last column whose weight is at least [`NEGLIGIBLE_WEIGHT`].  No slot
//! is ever left empty.

use crate::{ChoiceError, ChoiceResult, Matrix};

/// Weights below this are treated as zero by the residual fallback.
pub const NEGLIGIBLE_WEIGHT: f64 = 1e-30;

/// One filled sample slot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pick<A> {
    /// External id of the selected alternative.
    pub alt: A,
    /// The alternative's weight at selection time.
    pub prob: f64,
    /// Index of the caller's draw that produced this slot.
    pub draw: usize,
}

/// All sample slots of one chooser, in sorted-draw order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleRow<A> {
    pub picks: Vec<Pick<A>>,
}

impl<A: Copy + PartialEq> SampleRow<A> {
    /// Collapse repeated picks into `(alt, prob, count)`, first-seen order.
    ///
    /// Picks of one alternative are adjacent because slots follow column
    /// order, so a single pass suffices.
    pub fn pick_counts(&self) -> Vec<(A, f64, u32)> {
        let mut out: Vec<(A, f64, u32)> = Vec::new();
        for p in &self.picks {
            match out.last_mut() {
                Some((alt, _, count)) if *alt == p.alt => *count += 1,
                _ => out.push((p.alt, p.prob, 1)),
            }
        }
        out
    }

    /// For each output slot, the index of the caller's draw that filled it.
    pub fn draw_order(&self) -> Vec<usize> {
        self.picks.iter().map(|p| p.draw).collect()
    }

    /// Selected alternative ids in slot order.
    pub fn alts(&self) -> Vec<A> {
        self.picks.iter().map(|p| p.alt).collect()
    }
}

/// Result of [`sample_choices`].
#[derive(Clone, Debug, PartialEq)]
pub struct SampleOutcome<A> {
    /// Slots per chooser.
    pub n_samples: usize,
    /// One row per chooser, each exactly `n_samples` long.
    pub rows: Vec<SampleRow<A>>,
    /// Choosers that needed the residual fallback, ascending.
    pub residual_rows: Vec<usize>,
}

/// Draw `draws.cols()` alternatives per chooser with replacement.
///
/// - `probs`: `n_choosers × n_alts` weights.
/// - `draws`: `n_choosers × n_samples` uniforms in `[0, 1)`.
/// - `alt_ids`: external id of each of the `n_alts` columns.
pub fn sample_choices<A>(
    probs:   &Matrix,
    draws:   &Matrix,
    alt_ids: &[A],
) -> ChoiceResult<SampleOutcome<A>>
where
    A: Copy + Send + Sync,
{
    let (rows, cols) = probs.shape();
    let n_samples = draws.cols();
    if draws.rows() != rows {
        return Err(ChoiceError::ShapeMismatch { what: "draw rows", expected: rows, got: draws.rows() });
    }
    if alt_ids.len() != cols {
        return Err(ChoiceError::ShapeMismatch { what: "alternative ids", expected: cols, got: alt_ids.len() });
    }
    if rows > 0 && n_samples > 0 && cols == 0 {
        return Err(ChoiceError::NoAlternatives { rows });
    }

    #[cfg(not(feature = "parallel"))]
    let sampled: Vec<(SampleRow<A>, bool)> = (0..rows)
        .map(|r| sample_row(probs.row(r), draws.row(r), alt_ids))
        .collect();

    #[cfg(feature = "parallel")]
    let sampled: Vec<(SampleRow<A>, bool)> = {
        use rayon::prelude::*;
        (0..rows)
            .into_par_iter()
            .map(|r| sample_row(probs.row(r), draws.row(r), alt_ids))
            .collect()
    };

    let mut outcome = SampleOutcome { n_samples, rows: Vec::with_capacity(rows), residual_rows: Vec::new() };
    for (r, (row, residual)) in sampled.into_iter().enumerate() {
        outcome.rows.push(row);
        if residual {
            outcome.residual_rows.push(r);
        }
    }

    if !outcome.residual_rows.is_empty() {
        tracing::debug!(
            rows = outcome.residual_rows.len(),
            choosers = rows,
            "sample_choices filled trailing draws from last non-negligible alternative"
        );
    }
    Ok(outcome)
}

/// Sample one chooser.  Returns the row and whether the fallback was used.
fn sample_row<A: Copy>(weights: &[f64], draws: &[f64], alt_ids: &[A]) -> (SampleRow<A>, bool) {
    let n = draws.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| draws[a].total_cmp(&draws[b]));

    let mut picks: Vec<Pick<A>> = Vec::with_capacity(n);
    let mut z = 0.0;
    for (col, &w) in weights.iter().enumerate() {
        if picks.len() >= n {
            break;
        }
        z += w;
        while picks.len() < n {
            let draw = order[picks.len()];
            // NaN draws never fill a slot; they end in the fallback.
            if draws[draw].is_nan() || draws[draw] >= z {
                break;
            }
            picks.push(Pick { alt: alt_ids[col], prob: w, draw });
        }
    }

    let residual = picks.len() < n;
    if residual {
        let mut col = weights.len() - 1;
        while col > 0 && weights[col] < NEGLIGIBLE_WEIGHT {
            col -= 1;
        }
        while picks.len() < n {
            let draw = order[picks.len()];
            picks.push(Pick { alt: alt_ids[col], prob: weights[col], draw });
        }
    }

    (SampleRow { picks }, residual)
}
