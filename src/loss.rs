//! The clustering-loss capability shared by every loss strategy.
//!
//! A training loop hands a [`ClusteringBatch`] of borrowed arrays to any
//! [`ComputableClusteringLoss`] and receives [`ClusteringDeltas`]: the gradient
//! contributions to inject into the encoder, decoder, and centroid backward
//! passes. Strategies are interchangeable behind the trait; the orchestrator
//! picks one at configuration time (see [`crate::config`]).
//!
//! # Shapes
//!
//! | Array | Shape | Meaning |
//! |-------|-------|---------|
//! | `observed` | N × R | raw input batch |
//! | `reconstructed` | N × R | decoder output for the batch |
//! | `features` | N × D | embedded representation |
//! | `delta` | N × K × D | `feature − centroid_k` per sample and cluster |
//! | `q` | N × K × M | target distribution, M ≥ 1 estimates |
//! | `p` | N × K | current soft assignment |
//!
//! R (raw width) and D (embedding width) are independent. All other sizes must
//! agree across arrays; [`ClusteringBatch::validate`] checks this before any
//! arithmetic happens.

use alloc::vec::Vec;

use ndarray::{Array2, ArrayView2, ArrayView3};

use crate::aggregate::nan_rows;
use crate::error::{LossError, Result};
use crate::reduce::nan_mean;

// ─── Capability ──────────────────────────────────────────────────────────────

/// A clustering-specific loss that turns a batch into gradient deltas.
///
/// Implementations must be pure: the output depends only on the batch and on
/// construction-time configuration, and no input is mutated.
pub trait ComputableClusteringLoss {
    /// Compute the encoder, decoder, and centroid deltas for `batch`.
    ///
    /// # Errors
    ///
    /// Shape errors from [`ClusteringBatch::validate`], or any strategy-specific failure.
    fn compute_clustering_loss(&self, batch: &ClusteringBatch<'_>) -> Result<ClusteringDeltas>;
}

impl<T: ComputableClusteringLoss + ?Sized> ComputableClusteringLoss for alloc::boxed::Box<T> {
    fn compute_clustering_loss(&self, batch: &ClusteringBatch<'_>) -> Result<ClusteringDeltas> {
        (**self).compute_clustering_loss(batch)
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Borrowed views of every array a clustering loss may consult.
#[derive(Clone, Copy, Debug)]
pub struct ClusteringBatch<'a> {
    /// Observed data, N × R.
    pub observed: ArrayView2<'a, f64>,
    /// Reconstruction of the observed data, N × R.
    pub reconstructed: ArrayView2<'a, f64>,
    /// Embedded features, N × D.
    pub features: ArrayView2<'a, f64>,
    /// Feature-to-centroid differences, N × K × D.
    pub delta: ArrayView3<'a, f64>,
    /// Target distribution, N × K × M.
    pub q: ArrayView3<'a, f64>,
    /// Current soft assignment, N × K.
    pub p: ArrayView2<'a, f64>,
}

/// Sizes shared by a validated batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemShape {
    /// N.
    pub n_samples: usize,
    /// K.
    pub n_clusters: usize,
    /// D, the embedding width.
    pub n_features: usize,
    /// R, the raw observation width.
    pub n_observed_features: usize,
    /// M, the number of target-distribution estimates.
    pub n_estimates: usize,
}

impl<'a> ClusteringBatch<'a> {
    /// Bundle the six input arrays.
    pub fn new(
        observed: ArrayView2<'a, f64>,
        reconstructed: ArrayView2<'a, f64>,
        features: ArrayView2<'a, f64>,
        delta: ArrayView3<'a, f64>,
        q: ArrayView3<'a, f64>,
        p: ArrayView2<'a, f64>,
    ) -> Self {
        Self {
            observed,
            reconstructed,
            features,
            delta,
            q,
            p,
        }
    }

    /// Check that N, K, M, D, and R agree across all arrays.
    ///
    /// N, K, and D are taken from `delta`; M from `q`; R from `observed`.
    ///
    /// # Errors
    ///
    /// - [`LossError::EmptyAxis`] when K == 0 or M == 0.
    /// - [`LossError::IncompatibleShape`] for the first mismatching axis found.
    pub fn validate(&self) -> Result<ProblemShape> {
        let (n, k, d) = self.delta.dim();
        let (_, r) = self.observed.dim();
        let m = self.q.len_of(ndarray::Axis(2));

        if k == 0 {
            return Err(LossError::EmptyAxis { array: "delta_arr", axis: 1 });
        }
        if m == 0 {
            return Err(LossError::EmptyAxis { array: "q_arr", axis: 2 });
        }

        check("observed_arr", self.observed.shape(), &[n, r])?;
        check("reconstructed_arr", self.reconstructed.shape(), &[n, r])?;
        check("feature_arr", self.features.shape(), &[n, d])?;
        check("q_arr", self.q.shape(), &[n, k, m])?;
        check("p_arr", self.p.shape(), &[n, k])?;

        Ok(ProblemShape {
            n_samples: n,
            n_clusters: k,
            n_features: d,
            n_observed_features: r,
            n_estimates: m,
        })
    }
}

fn check(array: &'static str, found: &[usize], expected: &[usize]) -> Result<()> {
    match expected
        .iter()
        .zip(found)
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        Some((axis, (&expected, &found))) => Err(LossError::IncompatibleShape {
            array,
            axis,
            expected,
            found,
        }),
        None => Ok(()),
    }
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Gradient deltas produced by a clustering loss.
///
/// `None` means the strategy does not compute that contribution. It is not the
/// same as a computed all-zero delta, and callers must not treat it as one.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusteringDeltas {
    /// Delta for the encoder backward pass, N × D.
    pub encoder: Array2<f64>,
    /// Delta for the decoder backward pass, if computed.
    pub decoder: Option<Array2<f64>>,
    /// Delta for the centroid update, if computed.
    pub centroid: Option<Array2<f64>>,
}

impl ClusteringDeltas {
    /// Deltas carrying only an encoder contribution.
    pub fn encoder_only(encoder: Array2<f64>) -> Self {
        Self {
            encoder,
            decoder: None,
            centroid: None,
        }
    }

    /// Split into `(encoder, decoder, centroid)`.
    pub fn into_parts(self) -> (Array2<f64>, Option<Array2<f64>>, Option<Array2<f64>>) {
        (self.encoder, self.decoder, self.centroid)
    }

    /// Samples whose encoder delta contains NaN.
    ///
    /// These must be handled before the delta is applied to any weights.
    pub fn nan_samples(&self) -> Vec<usize> {
        nan_rows(&self.encoder)
    }

    /// True when every computed delta is free of NaN and infinity.
    pub fn is_finite(&self) -> bool {
        core::iter::once(&self.encoder)
            .chain(self.decoder.as_ref())
            .chain(self.centroid.as_ref())
            .all(|a| a.iter().all(|v| v.is_finite()))
    }

    /// Mean of the defined encoder-delta entries, for monitoring.
    pub fn encoder_loss(&self) -> f64 {
        nan_mean(self.encoder.iter().copied())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    struct Owned {
        observed: Array2<f64>,
        reconstructed: Array2<f64>,
        features: Array2<f64>,
        delta: Array3<f64>,
        q: Array3<f64>,
        p: Array2<f64>,
    }

    impl Owned {
        fn new(n: usize, k: usize, d: usize, r: usize, m: usize) -> Self {
            Self {
                observed: Array2::zeros((n, r)),
                reconstructed: Array2::zeros((n, r)),
                features: Array2::zeros((n, d)),
                delta: Array3::zeros((n, k, d)),
                q: Array3::zeros((n, k, m)),
                p: Array2::zeros((n, k)),
            }
        }

        fn batch(&self) -> ClusteringBatch<'_> {
            ClusteringBatch::new(
                self.observed.view(),
                self.reconstructed.view(),
                self.features.view(),
                self.delta.view(),
                self.q.view(),
                self.p.view(),
            )
        }
    }

    #[test]
    fn test_validate_consistent_batch() {
        let owned = Owned::new(4, 3, 2, 5, 1);
        assert_eq!(
            owned.batch().validate().unwrap(),
            ProblemShape {
                n_samples: 4,
                n_clusters: 3,
                n_features: 2,
                n_observed_features: 5,
                n_estimates: 1,
            }
        );
    }

    #[test]
    fn test_validate_rejects_sample_count_mismatch() {
        let mut owned = Owned::new(4, 3, 2, 5, 1);
        owned.p = Array2::zeros((3, 3));
        assert_eq!(
            owned.batch().validate(),
            Err(LossError::IncompatibleShape {
                array: "p_arr",
                axis: 0,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_validate_rejects_cluster_count_mismatch() {
        let mut owned = Owned::new(4, 3, 2, 5, 2);
        owned.q = Array3::zeros((4, 2, 2));
        assert!(matches!(
            owned.batch().validate(),
            Err(LossError::IncompatibleShape { array: "q_arr", axis: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_feature_width_mismatch() {
        let mut owned = Owned::new(4, 3, 2, 5, 1);
        owned.features = Array2::zeros((4, 3));
        assert!(matches!(
            owned.batch().validate(),
            Err(LossError::IncompatibleShape { array: "feature_arr", axis: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_reconstruction_width_mismatch() {
        let mut owned = Owned::new(4, 3, 2, 5, 1);
        owned.reconstructed = Array2::zeros((4, 4));
        assert!(matches!(
            owned.batch().validate(),
            Err(LossError::IncompatibleShape { array: "reconstructed_arr", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_cluster_axis() {
        let owned = Owned::new(4, 0, 2, 5, 1);
        assert_eq!(
            owned.batch().validate(),
            Err(LossError::EmptyAxis { array: "delta_arr", axis: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_empty_estimate_axis() {
        let owned = Owned::new(4, 3, 2, 5, 0);
        assert_eq!(
            owned.batch().validate(),
            Err(LossError::EmptyAxis { array: "q_arr", axis: 2 })
        );
    }

    #[test]
    fn test_encoder_only_marks_others_absent() {
        let deltas = ClusteringDeltas::encoder_only(Array2::zeros((2, 2)));
        let (encoder, decoder, centroid) = deltas.into_parts();
        assert_eq!(encoder.dim(), (2, 2));
        assert!(decoder.is_none());
        assert!(centroid.is_none());
    }

    #[test]
    fn test_nan_samples_and_finiteness() {
        let mut encoder = Array2::from_elem((3, 2), 1.0);
        encoder[[2, 1]] = f64::NAN;
        let deltas = ClusteringDeltas::encoder_only(encoder);
        assert_eq!(deltas.nan_samples(), vec![2]);
        assert!(!deltas.is_finite());
        // defined entries: five 1.0s
        assert!((deltas.encoder_loss() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_finite_checks_present_deltas() {
        let mut deltas = ClusteringDeltas::encoder_only(Array2::zeros((1, 1)));
        assert!(deltas.is_finite());
        deltas.centroid = Some(Array2::from_elem((1, 1), f64::INFINITY));
        assert!(!deltas.is_finite());
    }
}
