//! Construction-time configuration for clustering losses.
//!
//! A [`ClusteringLossConfig`] names a [`LossStrategy`] and a weight, and
//! [`ClusteringLossConfig::build`] turns it into a boxed
//! [`ComputableClusteringLoss`] the training loop can call without knowing which
//! strategy it holds.
//!
//! With the `serde` feature the config loads from any serde format:
//!
//! ```json
//! { "strategy": "k_means", "weight": 0.25 }
//! ```
//!
//! Missing fields fall back to [`LossStrategy::KMeans`] and [`DEFAULT_WEIGHT`].

use alloc::boxed::Box;

use crate::error::{LossError, Result};
use crate::kmeans::ClusteringLossComputer;
use crate::loss::ComputableClusteringLoss;

/// Weight used when none is configured.
pub const DEFAULT_WEIGHT: f64 = 0.125;

// ─── LossWeight ──────────────────────────────────────────────────────────────

/// Non-negative, finite scale applied to a clustering delta.
///
/// A negative weight would invert the gradient and is rejected rather than
/// silently accepted.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LossWeight(f64);

impl LossWeight {
    /// Validate `weight`.
    ///
    /// # Errors
    ///
    /// [`LossError::InvalidWeight`] for negative, NaN, or infinite values.
    pub fn new(weight: f64) -> Result<Self> {
        if weight.is_finite() && weight >= 0.0 {
            Ok(Self(weight))
        } else {
            Err(LossError::InvalidWeight { weight })
        }
    }

    /// The raw scalar.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for LossWeight {
    fn default() -> Self {
        Self(DEFAULT_WEIGHT)
    }
}

impl TryFrom<f64> for LossWeight {
    type Error = LossError;

    fn try_from(weight: f64) -> Result<Self> {
        Self::new(weight)
    }
}

// ─── Strategy selection ──────────────────────────────────────────────────────

/// Which clustering-loss formulation to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum LossStrategy {
    /// Squared distance to the pseudo-labelled centroid ([`ClusteringLossComputer`]).
    #[default]
    KMeans,
}

/// Strategy plus weight, as read from a training configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusteringLossConfig {
    /// Loss formulation.
    pub strategy: LossStrategy,
    /// Unvalidated weight; checked by [`ClusteringLossConfig::build`].
    pub weight: f64,
}

impl Default for ClusteringLossConfig {
    fn default() -> Self {
        Self {
            strategy: LossStrategy::KMeans,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl ClusteringLossConfig {
    /// Instantiate the configured strategy.
    ///
    /// # Errors
    ///
    /// [`LossError::InvalidWeight`] when `weight` is negative or non-finite.
    pub fn build(&self) -> Result<Box<dyn ComputableClusteringLoss + Send + Sync>> {
        let weight = LossWeight::new(self.weight)?;
        match self.strategy {
            LossStrategy::KMeans => Ok(Box::new(ClusteringLossComputer::new(weight))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_accepts_zero_and_positive() {
        assert_eq!(LossWeight::new(0.0).unwrap().get(), 0.0);
        assert_eq!(LossWeight::new(2.5).unwrap().get(), 2.5);
    }

    #[test]
    fn test_weight_rejects_negative() {
        assert_eq!(
            LossWeight::new(-0.1),
            Err(LossError::InvalidWeight { weight: -0.1 })
        );
    }

    #[test]
    fn test_weight_rejects_non_finite() {
        assert!(LossWeight::new(f64::NAN).is_err());
        assert!(LossWeight::new(f64::INFINITY).is_err());
        assert!(LossWeight::try_from(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_default_weight() {
        assert_eq!(LossWeight::default().get(), DEFAULT_WEIGHT);
        assert_eq!(ClusteringLossConfig::default().weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_build_rejects_bad_weight() {
        let config = ClusteringLossConfig {
            strategy: LossStrategy::KMeans,
            weight: -1.0,
        };
        assert!(matches!(
            config.build(),
            Err(LossError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_build_kmeans() {
        assert!(ClusteringLossConfig::default().build().is_ok());
    }
}
