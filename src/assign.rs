//! Pseudo-label assignment from a target distribution.
//!
//! The target distribution Q arrives as N × K × M, where the trailing axis holds
//! M ≥ 1 independent estimates of each sample's cluster distribution. The
//! estimates are consensus-averaged (NaN-tolerant) into an N × K matrix and
//! each row is collapsed to the index of its most probable cluster.
//!
//! # Known limitation
//!
//! A row that is entirely NaN, or whose maximum is shared by several clusters,
//! has no meaningful argmax. Such rows fall back to the first candidate index
//! (0 for an all-NaN row, the lowest tied index otherwise). The fallback is
//! deterministic but carries no information; [`ambiguous_rows`] reports which
//! rows took it so the caller can decide what to do with them.

use alloc::vec::Vec;

use ndarray::{Array1, Array2, ArrayView2, ArrayView3, Axis};

use crate::error::{LossError, Result};
use crate::reduce::{nan_argmax, nan_mean_axis};

/// Collapse an N × K × M target distribution to N × K.
///
/// M == 1 is a plain reshape; M > 1 is a NaN-tolerant mean over the trailing axis.
///
/// # Errors
///
/// [`LossError::EmptyAxis`] when M == 0.
pub fn collapse_target(q_arr: ArrayView3<'_, f64>) -> Result<Array2<f64>> {
    match q_arr.len_of(Axis(2)) {
        0 => Err(LossError::EmptyAxis { array: "q_arr", axis: 2 }),
        1 => Ok(q_arr.index_axis(Axis(2), 0).to_owned()),
        _ => Ok(nan_mean_axis(&q_arr, Axis(2))),
    }
}

/// Hard pseudo-label per row of an already collapsed N × K target.
///
/// All-NaN rows are labelled 0.
pub fn labels_from_target(target: ArrayView2<'_, f64>) -> Array1<usize> {
    target
        .outer_iter()
        .map(|row| nan_argmax(row).unwrap_or(0))
        .collect()
}

/// Collapse `q_arr` and derive one pseudo-label per sample, each in `[0, K)`.
///
/// # Errors
///
/// [`LossError::EmptyAxis`] when K == 0 or M == 0.
pub fn assign_labels(q_arr: ArrayView3<'_, f64>) -> Result<Array1<usize>> {
    if q_arr.len_of(Axis(1)) == 0 {
        return Err(LossError::EmptyAxis { array: "q_arr", axis: 1 });
    }
    let target = collapse_target(q_arr)?;
    Ok(labels_from_target(target.view()))
}

/// Rows of a collapsed target whose label came from the fallback rule:
/// entirely NaN, or a maximum attained by more than one cluster.
pub fn ambiguous_rows(target: ArrayView2<'_, f64>) -> Vec<usize> {
    target
        .outer_iter()
        .enumerate()
        .filter(|(_, row)| match nan_argmax(row.view()) {
            None => true,
            Some(i) => {
                let max = row[i];
                row.iter().filter(|&&v| v == max).count() > 1
            }
        })
        .map(|(n, _)| n)
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
