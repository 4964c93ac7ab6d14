//! Masked, NaN-tolerant, weighted aggregation of squared centroid offsets.
//!
//! For each sample n and feature d:
//!
//! ```text
//! v[k]      = mask[n, k, 0] · delta[n, k, d]²
//! out[n, d] = weight · mean over k of the defined v[k]
//! ```
//!
//! # NaN rules
//!
//! - A NaN `v[k]` in a masked-out slot (mask == 0) is dropped from the
//!   denominator. This includes `0 · ∞`.
//! - A NaN `v[k]` in a selected slot (mask != 0) makes `out[n, d]` NaN: the
//!   assigned cluster's own distance is undefined, so the delta is too.
//! - A slice where every `v[k]` is dropped is NaN.
//!
//! Masked-out zeros are real zeros and count toward the mean.

use ndarray::{Array2, ArrayView3, Axis};

use crate::error::{LossError, Result};

/// Square `delta_arr`, apply `mask`, and take the NaN-tolerant mean over the cluster axis.
///
/// `delta_arr` is N × K × D, `mask` is N × K × 1. Returns N × D.
///
/// # Errors
///
/// [`LossError::IncompatibleShape`] when the mask's N or K differ from the
/// delta's, or its trailing axis is not 1.
pub fn masked_squared_mean(
    delta_arr: ArrayView3<'_, f64>,
    mask: ArrayView3<'_, f64>,
) -> Result<Array2<f64>> {
    let (n, k, d) = delta_arr.dim();
    let expected = [n, k, 1];
    for (axis, (&want, &got)) in expected.iter().zip(mask.shape()).enumerate() {
        if want != got {
            return Err(LossError::IncompatibleShape {
                array: "mask",
                axis,
                expected: want,
                found: got,
            });
        }
    }

    Ok(Array2::from_shape_fn((n, d), |(i, j)| {
        let mut sum = 0.0;
        let mut count = 0_usize;
        for c in 0..k {
            let m = mask[[i, c, 0]];
            let x = delta_arr[[i, c, j]];
            let v = m * (x * x);
            if v.is_nan() {
                if m != 0.0 {
                    return f64::NAN;
                }
                continue;
            }
            sum += v;
            count += 1;
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }))
}

/// Scale an aggregated delta by the loss weight.
pub fn weighted(mut mean: Array2<f64>, weight: f64) -> Array2<f64> {
    mean.mapv_inplace(|v| v * weight);
    mean
}

/// Row indices of `delta` holding at least one NaN.
pub fn nan_rows(delta: &Array2<f64>) -> alloc::vec::Vec<usize> {
    delta
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| row.iter().any(|v| v.is_nan()))
        .map(|(n, _)| n)
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn worked_example() -> (Array3<f64>, Array3<f64>) {
        let delta = array![[[1.0], [3.0]], [[2.0], [5.0]]];
        let mask = array![[[1.0], [0.0]], [[0.0], [1.0]]];
        (delta, mask)
    }

    #[test]
    fn test_worked_example_mean() {
        let (delta, mask) = worked_example();
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        assert_eq!(out, array![[0.5], [12.5]]);
    }

    #[test]
    fn test_weight_scales_linearly() {
        let (delta, mask) = worked_example();
        let out = weighted(masked_squared_mean(delta.view(), mask.view()).unwrap(), 0.5);
        assert_eq!(out, array![[0.25], [6.25]]);
    }

    #[test]
    fn test_nan_in_masked_out_slot_is_excluded() {
        // assigned cluster 0 → 4; cluster 1 undefined → dropped from denominator
        let delta = array![[[2.0], [f64::NAN]]];
        let mask = array![[[1.0], [0.0]]];
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        assert_eq!(out, array![[4.0]]);
    }

    #[test]
    fn test_nan_in_selected_slot_propagates() {
        let delta = array![[[f64::NAN], [3.0]]];
        let mask = array![[[1.0], [0.0]]];
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        assert!(out[[0, 0]].is_nan());
    }

    #[test]
    fn test_infinite_masked_out_slot_is_excluded() {
        let delta = array![[[1.0], [f64::INFINITY], [0.0]]];
        let mask = array![[[1.0], [0.0], [0.0]]];
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        assert!((out[[0, 0]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_nan_slice_is_nan() {
        let delta = array![[[f64::NAN], [f64::NAN]]];
        let mask = array![[[0.0], [1.0]]];
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        assert!(out[[0, 0]].is_nan());
    }

    #[test]
    fn test_nan_only_affects_its_feature_column() {
        let delta = array![[[1.0, f64::NAN], [2.0, 2.0]]];
        let mask = array![[[0.0], [1.0]]];
        let out = masked_squared_mean(delta.view(), mask.view()).unwrap();
        // column 0: (0 + 4) / 2; column 1: NaN dropped from masked-out slot → 4 / 1
        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((out[[0, 1]] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_mask_shape_mismatch_is_error() {
        let (delta, _) = worked_example();
        let mask = Array3::<f64>::zeros((2, 3, 1));
        assert_eq!(
            masked_squared_mean(delta.view(), mask.view()),
            Err(LossError::IncompatibleShape {
                array: "mask",
                axis: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_mask_trailing_axis_must_be_one() {
        let (delta, _) = worked_example();
        let mask = Array3::<f64>::zeros((2, 2, 2));
        assert!(matches!(
            masked_squared_mean(delta.view(), mask.view()),
            Err(LossError::IncompatibleShape { axis: 2, .. })
        ));
    }

    #[test]
    fn test_nan_rows_lists_rows_with_nan() {
        let delta = array![[0.0, 1.0], [f64::NAN, 1.0], [2.0, 2.0]];
        assert_eq!(nan_rows(&delta), vec![1]);
    }
}
