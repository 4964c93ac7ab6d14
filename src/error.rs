//! Typed failures for clustering-loss computation.
//!
//! Every check the crate performs on caller input surfaces as a [`LossError`].
//! There is no I/O, so there are no transient failures and nothing to retry.

/// Error returned when inputs or configuration cannot produce a valid delta.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LossError {
    /// An input array disagrees with the others on N, K, M, or D.
    #[error("incompatible shape: {array} axis {axis} has size {found}, expected {expected}")]
    IncompatibleShape {
        /// Name of the offending input array.
        array: &'static str,
        /// Index of the mismatched axis.
        axis: usize,
        /// Size implied by the other inputs.
        expected: usize,
        /// Size actually found.
        found: usize,
    },

    /// An axis that must be non-empty (clusters, distribution estimates) has size zero.
    #[error("empty axis: {array} axis {axis} must be non-empty")]
    EmptyAxis {
        /// Name of the offending input array.
        array: &'static str,
        /// Index of the empty axis.
        axis: usize,
    },

    /// A pseudo-label does not index a cluster slot.
    #[error("label {label} for sample {sample} is out of range for {n_clusters} clusters")]
    LabelOutOfRange {
        /// Sample row holding the bad label.
        sample: usize,
        /// The label value.
        label: usize,
        /// Number of cluster slots available.
        n_clusters: usize,
    },

    /// The loss weight is negative, NaN, or infinite.
    #[error("invalid loss weight {weight}: must be finite and non-negative")]
    InvalidWeight {
        /// The rejected weight.
        weight: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LossError>;
