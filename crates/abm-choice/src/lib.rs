//! `abm-choice`: Monte-Carlo choice kernels.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`matrix`]  | `Matrix`: dense row-major `f64` matrix (choosers × alternatives)  |
//! | [`choice`]  | `make_choices`: one alternative per chooser                      |
//! | [`sample`]  | `sample_choices`: `n_samples` alternatives per chooser, with replacement  |
//! | [`logit`]   | `utils_to_probs`: row-wise softmax over available alternatives   |
//! | [`error`]   | `ChoiceError`, `ChoiceResult<T>`                                 |
//!
//! # Design notes
//!
//! Both kernels are pure functions over arrays.  Rows never influence one
//! another, so with the `parallel` feature they are evaluated on Rayon's
//! thread pool without changing any result.
//!
//! Neither kernel requires a row to sum to exactly 1.  When floating-point
//! error leaves a draw past the end of a row's cumulative weight, the kernel
//! falls back to a fixed alternative instead of failing, and reports the row
//! in `residual_rows` so callers can count how often that happens.

pub mod choice;
pub mod error;
pub mod logit;
pub mod matrix;
pub mod sample;

#[cfg(test)]
mod tests;

pub use choice::{ChoiceOutcome, make_choices};
pub use error::{ChoiceError, ChoiceResult};
pub use logit::utils_to_probs;
pub use matrix::Matrix;
pub use sample::{NEGLIGIBLE_WEIGHT, Pick, SampleOutcome, SampleRow, sample_choices};
