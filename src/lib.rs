//! # cluster-loss
//!
//! Clustering-loss gradient deltas for jointly training an embedding network and
//! a set of cluster centroids (deep embedded clustering).
//!
//! ---
//!
//! Given each sample's target distribution over clusters and its offset to every
//! centroid, the crate derives a hard pseudo-label per sample, keeps only the
//! squared offset to the assigned centroid, and averages it over the cluster axis
//! while tolerating undefined (NaN) entries. The weighted result is the delta the
//! training loop injects into the encoder's backward pass.
//!
//! Everything around that computation (the networks, centroid initialisation and
//! updates, the optimiser, batching) belongs to the caller.
//!
//! ## The pipeline
//!
//! ```text
//! q_arr (N×K×M) → collapse → argmax → labels (N) → one-hot mask (N×K×1)
//!                                                        ↓
//! delta_arr (N×K×D) → square → × mask → NaN-tolerant mean over K → × weight
//!                                                        ↓
//!                                   ClusteringDeltas { encoder: N×D, decoder: None, centroid: None }
//! ```
//!
//! ## Module overview
//!
//! | Module | Key items | What it does |
//! |--------|-----------|--------------|
//! | [`loss`] | [`ComputableClusteringLoss`], [`ClusteringBatch`], [`ClusteringDeltas`] | Capability shared by every loss strategy; input validation |
//! | [`kmeans`] | [`ClusteringLossComputer`] | K-Means-style encoder delta |
//! | [`config`] | [`ClusteringLossConfig`], [`LossStrategy`], [`LossWeight`] | Strategy selection and weight validation |
//! | [`assign`] | [`assign::assign_labels`] | Target distribution → pseudo-labels |
//! | [`mask`] | [`mask::one_hot_mask`] | Pseudo-labels → one-hot mask |
//! | [`aggregate`] | [`aggregate::masked_squared_mean`] | Masked, NaN-tolerant mean of squared offsets |
//! | [`reduce`] | [`reduce::nan_mean`], [`reduce::nan_argmax`] | NaN-skipping reductions |
//! | [`error`] | [`LossError`] | Typed failures |
//!
//! ## Quick start
//!
//! ```rust
//! use cluster_loss::{ClusteringBatch, ClusteringLossConfig, ComputableClusteringLoss};
//! use ndarray::{array, Array2};
//!
//! let loss = ClusteringLossConfig { weight: 1.0, ..Default::default() }.build().unwrap();
//!
//! let observed = Array2::<f64>::zeros((2, 4));
//! let features = Array2::<f64>::zeros((2, 1));
//! let delta = array![[[1.0], [3.0]], [[2.0], [5.0]]];
//! let q = array![[[0.9], [0.1]], [[0.2], [0.8]]];
//! let p = array![[0.9, 0.1], [0.2, 0.8]];
//! let batch = ClusteringBatch::new(
//!     observed.view(), observed.view(), features.view(), delta.view(), q.view(), p.view(),
//! );
//!
//! let deltas = loss.compute_clustering_loss(&batch).unwrap();
//! assert_eq!(deltas.encoder, array![[0.5], [12.5]]);
//! ```
//!
//! ## NaN handling
//!
//! NaN marks an undefined distance or probability. Reductions skip it instead of
//! letting it poison a whole row, but a NaN in the assigned cluster's own slot, or
//! a slice with nothing defined, yields NaN in the output. The crate never zeroes
//! such entries: check [`ClusteringDeltas::nan_samples`] before applying a delta.
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`. Enable `std` to
//! turn on the standard-library support of `ndarray`, `thiserror`, and `log`.
//! Enable `serde` to (de)serialise [`ClusteringLossConfig`], and `python-ffi` for
//! PyO3 bindings.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade: per-call shapes at `debug`,
//! pseudo-labels at `trace`, ambiguous target rows and undefined output samples at
//! `warn`. Install any `log`-compatible logger to see them.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate alloc;

pub mod aggregate;
pub mod assign;
pub mod config;
pub mod error;
pub mod kmeans;
pub mod loss;
pub mod mask;
pub mod reduce;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use config::{ClusteringLossConfig, LossStrategy, LossWeight, DEFAULT_WEIGHT};
pub use error::LossError;
pub use kmeans::ClusteringLossComputer;
pub use loss::{ClusteringBatch, ClusteringDeltas, ComputableClusteringLoss, ProblemShape};
