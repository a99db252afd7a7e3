//! Multinomial-logit probabilities from utilities.
//!
//! Utility evaluation itself belongs to the caller; this only turns a
//! utility matrix into the probability matrix the kernels consume.
//! `f64::NEG_INFINITY` marks an unavailable alternative and yields an exact
//! zero probability.

use crate::{ChoiceError, ChoiceResult, Matrix};

/// Row-wise softmax.
///
/// Each row is shifted by its largest finite utility before exponentiation
/// so large utilities cannot overflow.  A row with no finite utility has no
/// available alternative and is an error, as is any NaN or `+inf`.
pub fn utils_to_probs(utils: &Matrix) -> ChoiceResult<Matrix> {
    let (rows, cols) = utils.shape();
    let mut probs = Matrix::zeros(rows, cols);

    for r in 0..rows {
        let row = utils.row(r);
        if let Some(col) = row.iter().position(|u| u.is_nan() || *u == f64::INFINITY) {
            return Err(ChoiceError::InvalidUtility { row: r, col });
        }
        let max = row
            .iter()
            .copied()
            .filter(|u| u.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return Err(ChoiceError::NoAvailableAlternative { row: r });
        }

        let out = probs.row_mut(r);
        let mut total = 0.0;
        for (p, &u) in out.iter_mut().zip(row) {
            *p = if u == f64::NEG_INFINITY { 0.0 } else { (u - max).exp() };
            total += *p;
        }
        for p in out.iter_mut() {
            *p /= total;
        }
    }
    Ok(probs)
}
