//! K-Means-style clustering loss: pull each embedding toward its assigned centroid.
//!
//! # Pipeline
//!
//! ```text
//! q_arr ──► collapse + argmax ──► labels ──► one-hot mask
//!                                                 │
//! delta_arr ──► square ──► × mask ──► NaN-tolerant mean over K ──► × weight ──► encoder delta
//! ```
//!
//! Only the encoder contribution is computed. Decoder and centroid deltas are
//! returned as `None`.

use log::{debug, trace, warn};

use crate::aggregate::{masked_squared_mean, weighted};
use crate::assign::{ambiguous_rows, collapse_target, labels_from_target};
use crate::config::LossWeight;
use crate::error::Result;
use crate::loss::{ClusteringBatch, ClusteringDeltas, ComputableClusteringLoss};
use crate::mask::one_hot_mask;

/// Computes the K-Means-style encoder delta from squared centroid offsets.
///
/// The weight is fixed at construction; the computer holds no other state and
/// may be shared freely across threads.
///
/// # Example
///
/// ```rust
/// use cluster_loss::{ClusteringBatch, ClusteringLossComputer, ComputableClusteringLoss, LossWeight};
/// use ndarray::{array, Array2};
///
/// let computer = ClusteringLossComputer::new(LossWeight::new(1.0).unwrap());
/// let observed = Array2::<f64>::zeros((2, 1));
/// let features = Array2::<f64>::zeros((2, 1));
/// let delta = array![[[1.0], [3.0]], [[2.0], [5.0]]];
/// let q = array![[[0.9], [0.1]], [[0.2], [0.8]]];
/// let p = array![[0.9, 0.1], [0.2, 0.8]];
///
/// let batch = ClusteringBatch::new(
///     observed.view(), observed.view(), features.view(), delta.view(), q.view(), p.view(),
/// );
/// let deltas = computer.compute_clustering_loss(&batch).unwrap();
/// assert_eq!(deltas.encoder, array![[0.5], [12.5]]);
/// assert!(deltas.decoder.is_none() && deltas.centroid.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClusteringLossComputer {
    weight: LossWeight,
}

impl ClusteringLossComputer {
    /// Construct with a validated weight.
    pub fn new(weight: LossWeight) -> Self {
        Self { weight }
    }

    /// The weight applied to every delta this computer produces.
    pub fn weight(&self) -> LossWeight {
        self.weight
    }
}

impl ComputableClusteringLoss for ClusteringLossComputer {
    fn compute_clustering_loss(&self, batch: &ClusteringBatch<'_>) -> Result<ClusteringDeltas> {
        let shape = batch.validate()?;
        debug!(
            "kmeans clustering loss: n={} k={} d={} m={} weight={}",
            shape.n_samples,
            shape.n_clusters,
            shape.n_features,
            shape.n_estimates,
            self.weight.get()
        );

        let target = collapse_target(batch.q)?;
        let ambiguous = ambiguous_rows(target.view());
        if !ambiguous.is_empty() {
            warn!(
                "{} of {} target rows are all-NaN or tied; labelled by first index: {:?}",
                ambiguous.len(),
                shape.n_samples,
                ambiguous
            );
        }
        let labels = labels_from_target(target.view());
        trace!("pseudo-labels: {}", labels);

        let mask = one_hot_mask(labels.view(), shape.n_clusters)?;
        let mean = masked_squared_mean(batch.delta, mask.view())?;
        let deltas = ClusteringDeltas::encoder_only(weighted(mean, self.weight.get()));

        let nan_samples = deltas.nan_samples();
        if !nan_samples.is_empty() {
            warn!(
                "encoder delta undefined for {} sample(s): {:?}",
                nan_samples.len(),
                nan_samples
            );
        }
        Ok(deltas)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
