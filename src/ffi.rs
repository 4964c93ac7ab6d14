//! Python FFI bindings via PyO3.
//!
//! Exposes [`ClusteringLossComputer`] to Python over nested lists of floats, so a
//! Python training loop can obtain the encoder delta without a Rust toolchain on
//! the caller's side.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from cluster_loss import ClusteringLossComputer, assign_labels
//!
//! computer = ClusteringLossComputer(weight=1.0)
//! delta = [[[1.0], [3.0]], [[2.0], [5.0]]]          # N × K × D
//! q = [[[0.9], [0.1]], [[0.2], [0.8]]]              # N × K × M
//! p = [[0.9, 0.1], [0.2, 0.8]]                      # N × K
//! observed = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]     # N × R
//! features = [[0.0], [0.0]]                         # N × D
//!
//! encoder, decoder, centroid = computer.compute_clustering_loss(
//!     observed, observed, features, delta, q, p
//! )
//! print(encoder)            # [[0.5], [12.5]]
//! print(decoder, centroid)  # None None
//! print(assign_labels(q))   # [0, 1]
//! ```

use ndarray::{Array2, Array3};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::assign;
use crate::config::{LossWeight, DEFAULT_WEIGHT};
use crate::error::LossError;
use crate::kmeans::ClusteringLossComputer;
use crate::loss::{ClusteringBatch, ComputableClusteringLoss};

type Rows = Vec<Vec<f64>>;
type Cube = Vec<Vec<Vec<f64>>>;

fn to_py_err(err: LossError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ── Nested-list conversion ───────────────────────────────────────────────────

fn to_array2(name: &str, rows: Rows) -> PyResult<Array2<f64>> {
    let n = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(n * width);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(PyValueError::new_err(format!(
                "{name}[{i}] has {} elements, expected {width}",
                row.len()
            )));
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((n, width), flat)
        .map_err(|e| PyValueError::new_err(format!("{name}: {e}")))
}

fn to_array3(name: &str, cube: Cube) -> PyResult<Array3<f64>> {
    let n = cube.len();
    let k = cube.first().map_or(0, Vec::len);
    let d = cube
        .first()
        .and_then(|plane| plane.first())
        .map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(n * k * d);
    for (i, plane) in cube.into_iter().enumerate() {
        if plane.len() != k {
            return Err(PyValueError::new_err(format!(
                "{name}[{i}] has {} rows, expected {k}",
                plane.len()
            )));
        }
        for (j, row) in plane.into_iter().enumerate() {
            if row.len() != d {
                return Err(PyValueError::new_err(format!(
                    "{name}[{i}][{j}] has {} elements, expected {d}",
                    row.len()
                )));
            }
            flat.extend(row);
        }
    }
    Array3::from_shape_vec((n, k, d), flat)
        .map_err(|e| PyValueError::new_err(format!("{name}: {e}")))
}

fn to_rows(array: Array2<f64>) -> Rows {
    array.outer_iter().map(|row| row.to_vec()).collect()
}

// ── ClusteringLossComputer ───────────────────────────────────────────────────

/// K-Means-style clustering loss.
///
/// Computes the encoder delta from squared feature-to-centroid offsets, keeping
/// only each sample's pseudo-labelled cluster.
#[pyclass(name = "ClusteringLossComputer")]
#[derive(Clone)]
pub struct PyClusteringLossComputer {
    inner: ClusteringLossComputer,
}

#[pymethods]
impl PyClusteringLossComputer {
    /// Create a computer.
    ///
    /// Args:
    ///     weight: non-negative finite scale for the delta (default 0.125)
    ///
    /// Raises:
    ///     ValueError: if the weight is negative, NaN, or infinite
    #[new]
    #[pyo3(signature = (weight=DEFAULT_WEIGHT))]
    pub fn new(weight: f64) -> PyResult<Self> {
        let weight = LossWeight::new(weight).map_err(to_py_err)?;
        Ok(Self {
            inner: ClusteringLossComputer::new(weight),
        })
    }

    /// Returns the configured weight.
    #[getter]
    pub fn weight(&self) -> f64 {
        self.inner.weight().get()
    }

    /// Compute the clustering deltas.
    ///
    /// Args:
    ///     observed_arr:      N × R observed data
    ///     reconstructed_arr: N × R reconstruction
    ///     feature_arr:       N × D embedded features
    ///     delta_arr:         N × K × D feature-to-centroid differences
    ///     q_arr:             N × K × M target distribution
    ///     p_arr:             N × K soft assignment
    ///
    /// Returns:
    ///     (encoder_delta, None, None); encoder_delta is N × D
    ///
    /// Raises:
    ///     ValueError: on ragged lists or inconsistent shapes
    #[allow(clippy::too_many_arguments)]
    pub fn compute_clustering_loss(
        &self,
        observed_arr: Rows,
        reconstructed_arr: Rows,
        feature_arr: Rows,
        delta_arr: Cube,
        q_arr: Cube,
        p_arr: Rows,
    ) -> PyResult<(Rows, Option<Rows>, Option<Rows>)> {
        let observed = to_array2("observed_arr", observed_arr)?;
        let reconstructed = to_array2("reconstructed_arr", reconstructed_arr)?;
        let features = to_array2("feature_arr", feature_arr)?;
        let delta = to_array3("delta_arr", delta_arr)?;
        let q = to_array3("q_arr", q_arr)?;
        let p = to_array2("p_arr", p_arr)?;

        let batch = ClusteringBatch::new(
            observed.view(),
            reconstructed.view(),
            features.view(),
            delta.view(),
            q.view(),
            p.view(),
        );
        let (encoder, decoder, centroid) = self
            .inner
            .compute_clustering_loss(&batch)
            .map_err(to_py_err)?
            .into_parts();
        Ok((to_rows(encoder), decoder.map(to_rows), centroid.map(to_rows)))
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("ClusteringLossComputer(weight={})", self.inner.weight().get())
    }
}

// ── Module functions ─────────────────────────────────────────────────────────

/// Pseudo-label per sample from an N × K × M target distribution.
///
/// All-NaN or tied rows take the first candidate index.
#[pyfunction]
#[pyo3(name = "assign_labels")]
pub fn py_assign_labels(q_arr: Cube) -> PyResult<Vec<usize>> {
    let q = to_array3("q_arr", q_arr)?;
    let labels = assign::assign_labels(q.view()).map_err(to_py_err)?;
    Ok(labels.to_vec())
}

// ── Module entry point ───────────────────────────────────────────────────────

/// Clustering-loss deltas for deep embedded clustering.
#[pymodule]
pub fn cluster_loss(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyClusteringLossComputer>()?;
    m.add_function(wrap_pyfunction!(py_assign_labels, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("DEFAULT_WEIGHT", DEFAULT_WEIGHT)?;
    Ok(())
}
