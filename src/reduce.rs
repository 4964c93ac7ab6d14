//! NaN-tolerant reductions.
//!
//! Undefined entries (NaN) are skipped rather than poisoning a whole reduction:
//! the mean divides by the count of defined entries only, and the max-index scan
//! ignores NaN. A lane with no defined entry reduces to NaN (mean) or `None`
//! (argmax); it is never silently turned into zero.

use ndarray::{Array, ArrayView, ArrayView1, Axis, Dimension, RemoveAxis};

/// Mean of the non-NaN values, or NaN when no value is defined.
///
/// ```text
/// [1, NaN, 3] → 2
/// [NaN, NaN]  → NaN
/// []          → NaN
/// ```
pub fn nan_mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0_usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Apply [`nan_mean`] to every lane along `axis`, removing that axis.
pub fn nan_mean_axis<D>(array: &ArrayView<'_, f64, D>, axis: Axis) -> Array<f64, D::Smaller>
where
    D: Dimension + RemoveAxis,
{
    array.map_axis(axis, |lane| nan_mean(lane.iter().copied()))
}

/// Index of the first maximum among the non-NaN entries of `lane`.
///
/// Ties resolve to the lowest index. Returns `None` for an empty or all-NaN lane.
pub fn nan_argmax(lane: ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in lane.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
