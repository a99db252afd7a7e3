//! Unit tests for abm-choice.

use crate::Matrix;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn matrix(rows: &[&[f64]]) -> Matrix {
    Matrix::from_rows(rows).unwrap()
}

// ── Matrix ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod matrix_tests {
    use super::*;
    use crate::ChoiceError;

    #[test]
    fn from_rows_shape() {
        let m = matrix(&[&[0.1, 0.9], &[0.5, 0.5], &[1.0, 0.0]]);
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(1), &[0.5, 0.5]);
        assert_eq!(m.get(2, 0), 1.0);
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows: Vec<Vec<f64>> = vec![vec![0.5, 0.5], vec![1.0]];
        assert!(matches!(
            Matrix::from_rows(&rows),
            Err(ChoiceError::ShapeMismatch { what: "matrix row", expected: 2, got: 1 })
        ));
    }

    #[test]
    fn from_vec_length_checked() {
        assert!(Matrix::from_vec(2, 2, vec![0.0; 4]).is_ok());
        assert!(Matrix::from_vec(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn row_sums_and_mutation() {
        let mut m = Matrix::zeros(2, 3);
        m.set(0, 1, 0.25);
        m.row_mut(1).copy_from_slice(&[0.2, 0.3, 0.5]);
        assert_eq!(m.row_sums(), vec![0.25, 1.0]);
        assert_eq!(Matrix::filled(1, 2, 0.5).as_slice(), &[0.5, 0.5]);
    }
}

// ── make_choices ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod choice_tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::choice::choose_row;
    use crate::{ChoiceError, make_choices};

    #[test]
    fn boundary_draw_selects_first_column() {
        // 0.5 - 0.5 == 0 stops the walk at column 0.
        let out = make_choices(&matrix(&[&[0.5, 0.5]]), &[0.5]).unwrap();
        assert_eq!(out.columns, vec![0]);
        assert!(out.residual_rows.is_empty());
    }

    #[test]
    fn draw_just_past_boundary_selects_next_column() {
        let out = make_choices(&matrix(&[&[0.5, 0.5]]), &[0.500_001]).unwrap();
        assert_eq!(out.columns, vec![1]);
    }

    #[test]
    fn rows_are_independent() {
        let probs = matrix(&[&[0.2, 0.3, 0.5], &[0.2, 0.3, 0.5], &[1.0, 0.0, 0.0]]);
        let out = make_choices(&probs, &[0.1, 0.6, 0.99]).unwrap();
        assert_eq!(out.columns, vec![0, 2, 0]);
    }

    #[test]
    fn zero_weight_columns_are_skipped() {
        let out = make_choices(&matrix(&[&[0.0, 0.0, 1.0, 0.0]]), &[0.4]).unwrap();
        assert_eq!(out.columns, vec![2]);
    }

    #[test]
    fn residual_falls_back_to_max_weight() {
        // Row sums to 0.99; a draw of 0.995 walks off the end.
        let out = make_choices(&matrix(&[&[0.3, 0.3, 0.39]]), &[0.995]).unwrap();
        assert_eq!(out.columns, vec![2]);
        assert_eq!(out.residual_rows, vec![0]);
        assert_eq!(out.residual_count(), 1);
    }

    #[test]
    fn residual_tie_keeps_first_max() {
        assert_eq!(choose_row(&[0.4, 0.4, 0.1], 0.95), (0, true));
        assert_eq!(choose_row(&[0.1, 0.4, 0.4], 0.95), (1, true));
    }

    #[test]
    fn malformed_draw_never_panics() {
        let out = make_choices(&matrix(&[&[0.2, 0.8], &[0.6, 0.4]]), &[1.5, f64::NAN]).unwrap();
        assert_eq!(out.columns, vec![1, 0]);
        assert_eq!(out.residual_rows, vec![0, 1]);
    }

    #[test]
    fn draw_count_must_match_rows() {
        let err = make_choices(&matrix(&[&[1.0], &[1.0]]), &[0.5]).unwrap_err();
        assert!(matches!(err, ChoiceError::ShapeMismatch { what: "draws", expected: 2, got: 1 }));
    }

    #[test]
    fn rows_without_columns_rejected() {
        let err = make_choices(&Matrix::zeros(2, 0), &[0.1, 0.2]).unwrap_err();
        assert!(matches!(err, ChoiceError::NoAlternatives { rows: 2 }));
    }

    #[test]
    fn no_choosers_is_empty() {
        let out = make_choices(&Matrix::zeros(0, 3), &[]).unwrap();
        assert!(out.columns.is_empty());
    }

    #[test]
    fn frequencies_converge_to_weights() {
        const N: usize = 100_000;
        let weights = [0.2, 0.5, 0.3];
        let probs = Matrix::from_vec(N, 3, weights.repeat(N)).unwrap();
        let mut rng = SmallRng::seed_from_u64(2024);
        let draws: Vec<f64> = (0..N).map(|_| rng.r#gen::<f64>()).collect();

        let out = make_choices(&probs, &draws).unwrap();
        let mut counts = [0usize; 3];
        for c in out.columns {
            counts[c] += 1;
        }
        for (count, w) in counts.iter().zip(weights) {
            let freq = *count as f64 / N as f64;
            assert!((freq - w).abs() < 0.01, "freq {freq} vs weight {w}");
        }
    }
}

#[cfg(test)]
mod choice_props {
    use proptest::prelude::*;

    use crate::{Matrix, make_choices};

    proptest! {
        #[test]
        fn every_row_gets_a_valid_column(
            rows in prop::collection::vec(prop::collection::vec(0.0f64..1.0, 4), 1..20),
            draw_scale in 0.0f64..1.5,
        ) {
            let probs = Matrix::from_rows(&rows).unwrap();
            let draws: Vec<f64> = (0..rows.len()).map(|i| (draw_scale * (i as f64 + 1.0)) % 1.5).collect();
            let out = make_choices(&probs, &draws).unwrap();
            prop_assert_eq!(out.columns.len(), rows.len());
            prop_assert!(out.columns.iter().all(|&c| c < 4));
        }
    }
}

// ── sample_choices ────────────────────────────────────────────────────────────

#[cfg(test)]
mod sample_tests {
    use super::*;
    use crate::{ChoiceError, make_choices, sample_choices};

    #[test]
    fn merges_sorted_draws_with_staircase() {
        let probs = matrix(&[&[0.2, 0.3, 0.5]]);
        let draws = matrix(&[&[0.9, 0.1, 0.45]]);
        let out = sample_choices(&probs, &draws, &[10u32, 20, 30]).unwrap();

        let row = &out.rows[0];
        assert_eq!(row.alts(), vec![10, 20, 30]);
        let origin = row.draw_order();
        assert_eq!(origin, vec![1, 2, 0]);
        assert_eq!(row.picks[1].prob, 0.3);
        assert!(out.residual_rows.is_empty());
    }

    #[test]
    fn residual_fills_every_slot() {
        // Weights sum to 0.999999; the 0.9999999 draw lies past the staircase.
        let probs = matrix(&[&[0.5, 0.499_999, 0.0]]);
        let draws = matrix(&[&[0.999_999_9, 0.2]]);
        let out = sample_choices(&probs, &draws, &[1u32, 2, 3]).unwrap();

        assert_eq!(out.n_samples, 2);
        assert_eq!(out.rows[0].picks.len(), 2);
        // The trailing zero-weight column is skipped by the back-up.
        assert_eq!(out.rows[0].alts(), vec![1, 2]);
        assert_eq!(out.rows[0].picks[1].prob, 0.499_999);
        assert_eq!(out.residual_rows, vec![0]);
    }

    #[test]
    fn repeats_are_kept_and_counted() {
        let probs = matrix(&[&[0.0, 1.0, 0.0]]);
        let draws = matrix(&[&[0.1, 0.5, 0.9, 0.3]]);
        let out = sample_choices(&probs, &draws, &['a', 'b', 'c']).unwrap();
        assert_eq!(out.rows[0].alts(), vec!['b'; 4]);
        assert_eq!(out.rows[0].pick_counts(), vec![('b', 1.0, 4)]);
    }

    #[test]
    fn pick_counts_first_seen_order() {
        let probs = matrix(&[&[0.5, 0.5]]);
        let draws = matrix(&[&[0.7, 0.1, 0.2, 0.6, 0.8]]);
        let out = sample_choices(&probs, &draws, &[7u32, 9]).unwrap();
        assert_eq!(out.rows[0].pick_counts(), vec![(7, 0.5, 2), (9, 0.5, 3)]);
    }

    #[test]
    fn multiple_choosers() {
        let probs = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let draws = matrix(&[&[0.3, 0.6], &[0.3, 0.6]]);
        let out = sample_choices(&probs, &draws, &[100u32, 200]).unwrap();
        assert_eq!(out.rows[0].alts(), vec![100, 100]);
        assert_eq!(out.rows[1].alts(), vec![200, 200]);
    }

    #[test]
    fn nan_draw_takes_fallback_like_make_choices() {
        let probs = matrix(&[&[0.0, 1.0]]);
        let out = sample_choices(&probs, &matrix(&[&[f64::NAN]]), &[10u32, 20]).unwrap();
        assert_eq!(out.rows[0].alts(), vec![20]);
        assert_eq!(out.rows[0].picks[0].prob, 1.0);
        assert_eq!(out.residual_rows, vec![0]);

        let single = make_choices(&probs, &[f64::NAN]).unwrap();
        assert_eq!(single.columns, vec![1]);
        assert_eq!(single.residual_rows, vec![0]);
    }

    #[test]
    fn nan_draw_after_valid_draws() {
        let probs = matrix(&[&[0.6, 0.4]]);
        let out = sample_choices(&probs, &matrix(&[&[f64::NAN, 0.2]]), &[1u32, 2]).unwrap();
        // Valid draw fills first; NaN sorts last and backs up to column 1.
        assert_eq!(out.rows[0].alts(), vec![1, 2]);
        assert_eq!(out.rows[0].draw_order(), vec![1, 0]);
        assert_eq!(out.residual_rows, vec![0]);
    }

    #[test]
    fn shapes_validated() {
        let probs = matrix(&[&[0.5, 0.5]]);
        let draws = matrix(&[&[0.1], &[0.2]]);
        assert!(matches!(
            sample_choices(&probs, &draws, &[1u32, 2]),
            Err(ChoiceError::ShapeMismatch { what: "draw rows", .. })
        ));
        let draws = matrix(&[&[0.1]]);
        assert!(matches!(
            sample_choices(&probs, &draws, &[1u32]),
            Err(ChoiceError::ShapeMismatch { what: "alternative ids", .. })
        ));
        assert!(matches!(
            sample_choices::<u32>(&Matrix::zeros(1, 0), &draws, &[]),
            Err(ChoiceError::NoAlternatives { rows: 1 })
        ));
    }
}

#[cfg(test)]
mod sample_props {
    use proptest::prelude::*;

    use crate::{Matrix, sample_choices};

    proptest! {
        #[test]
        fn every_chooser_gets_exactly_n_samples(
            weights in prop::collection::vec(0.0f64..1.0, 1..12),
            draws in prop::collection::vec(0.0f64..1.0, 1..30),
        ) {
            let total: f64 = weights.iter().sum();
            let row: Vec<f64> = if total > 0.0 {
                weights.iter().map(|w| w / total).collect()
            } else {
                weights.clone()
            };
            let ids: Vec<usize> = (0..row.len()).collect();
            let probs = Matrix::from_rows(&[row]).unwrap();
            let draw_m = Matrix::from_rows(&[draws.clone()]).unwrap();

            let out = sample_choices(&probs, &draw_m, &ids).unwrap();
            prop_assert_eq!(out.rows[0].picks.len(), draws.len());

            let mut origin: Vec<usize> = out.rows[0].picks.iter().map(|p| p.draw).collect();
            origin.sort_unstable();
            prop_assert_eq!(origin, (0..draws.len()).collect::<Vec<_>>());
        }
    }
}

// ── utils_to_probs ────────────────────────────────────────────────────────────

#[cfg(test)]
mod logit_tests {
    use super::*;
    use crate::{ChoiceError, utils_to_probs};

    #[test]
    fn equal_utilities_equal_probabilities() {
        let p = utils_to_probs(&matrix(&[&[1.0, 1.0, 1.0, 1.0]])).unwrap();
        for &x in p.row(0) {
            assert!((x - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn unavailable_alternatives_get_zero() {
        let p = utils_to_probs(&matrix(&[&[0.0, f64::NEG_INFINITY, 0.0]])).unwrap();
        assert_eq!(p.get(0, 1), 0.0);
        assert!((p.get(0, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn large_utilities_do_not_overflow() {
        let p = utils_to_probs(&matrix(&[&[1000.0, 1000.0 + 2f64.ln()]])).unwrap();
        assert!((p.get(0, 0) - 1.0 / 3.0).abs() < 1e-9);
        assert!((p.row_sums()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn all_unavailable_row_is_error() {
        let err = utils_to_probs(&matrix(&[&[0.0], &[f64::NEG_INFINITY]])).unwrap_err();
        assert!(matches!(err, ChoiceError::NoAvailableAlternative { row: 1 }));
    }

    #[test]
    fn nan_utility_is_error() {
        let err = utils_to_probs(&matrix(&[&[0.0, f64::NAN]])).unwrap_err();
        assert!(matches!(err, ChoiceError::InvalidUtility { row: 0, col: 1 }));
    }
}
