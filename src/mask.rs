//! One-hot cluster masks.
//!
//! The mask is N × K × 1 so it broadcasts over the feature axis of an
//! N × K × D delta tensor. Every row holds exactly one 1, at the sample's
//! pseudo-label; all other slots are 0.

use ndarray::{Array3, ArrayView1};

use crate::error::{LossError, Result};

/// Build the N × K × 1 one-hot mask for `labels`.
///
/// # Errors
///
/// [`LossError::LabelOutOfRange`] for the first label `>= n_clusters`.
pub fn one_hot_mask(labels: ArrayView1<'_, usize>, n_clusters: usize) -> Result<Array3<f64>> {
    let mut mask = Array3::zeros((labels.len(), n_clusters, 1));
    for (sample, &label) in labels.iter().enumerate() {
        if label >= n_clusters {
            return Err(LossError::LabelOutOfRange {
                sample,
                label,
                n_clusters,
            });
        }
        mask[[sample, label, 0]] = 1.0;
    }
    Ok(mask)
}
