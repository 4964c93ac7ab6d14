//! # One clustering step on a toy embedding
//!
//! Builds a small batch of 2-D embeddings around three centroids, derives the
//! Student-t soft assignment P and the sharpened target distribution Q the way a
//! deep-embedded-clustering trainer would, then asks the clustering loss for the
//! encoder delta.
//!
//! Run with `cargo run --example training_step`.

use cluster_loss::{ClusteringBatch, ClusteringLossConfig, ComputableClusteringLoss};
use ndarray::{array, Array2, Array3, Axis};

// ── Batch ────────────────────────────────────────────────────────────────────

fn centroids() -> Array2<f64> {
    array![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]
}

fn features() -> Array2<f64> {
    array![
        [0.3, -0.2],
        [3.6, 0.4],
        [0.1, 4.5],
        [2.0, 2.0],
        [4.2, -0.3],
        [-0.4, 3.9],
    ]
}

/// `feature − centroid_k` for every sample and cluster.
fn deltas(features: &Array2<f64>, centroids: &Array2<f64>) -> Array3<f64> {
    let (n, d) = features.dim();
    let k = centroids.nrows();
    Array3::from_shape_fn((n, k, d), |(i, c, j)| features[[i, j]] - centroids[[c, j]])
}

/// Student-t kernel with one degree of freedom, normalised per sample.
fn soft_assignment(delta: &Array3<f64>) -> Array2<f64> {
    let sq = delta.mapv(|v| v * v).sum_axis(Axis(2));
    let mut p = sq.mapv(|s| 1.0 / (1.0 + s));
    for mut row in p.outer_iter_mut() {
        let total = row.sum();
        row.mapv_inplace(|v| v / total);
    }
    p
}

/// Sharpened target: `p² / f` per column, renormalised per sample.
fn target_distribution(p: &Array2<f64>) -> Array3<f64> {
    let freq = p.sum_axis(Axis(0));
    let mut q = Array2::from_shape_fn(p.dim(), |(i, c)| p[[i, c]] * p[[i, c]] / freq[c]);
    for mut row in q.outer_iter_mut() {
        let total = row.sum();
        row.mapv_inplace(|v| v / total);
    }
    q.insert_axis(Axis(2))
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() {
    let features = features();
    let delta = deltas(&features, &centroids());
    let p = soft_assignment(&delta);
    let q = target_distribution(&p);
    let observed = Array2::<f64>::zeros((features.nrows(), 8));

    let loss = match ClusteringLossConfig::default().build() {
        Ok(loss) => loss,
        Err(e) => {
            eprintln!("config rejected: {e}");
            return;
        }
    };

    let batch = ClusteringBatch::new(
        observed.view(),
        observed.view(),
        features.view(),
        delta.view(),
        q.view(),
        p.view(),
    );

    match loss.compute_clustering_loss(&batch) {
        Ok(deltas) => {
            println!("soft assignment P:\n{:.3}", p);
            println!("encoder delta:\n{:.4}", deltas.encoder);
            println!("monitoring loss: {:.4}", deltas.encoder_loss());
            println!(
                "decoder delta computed: {}, centroid delta computed: {}",
                deltas.decoder.is_some(),
                deltas.centroid.is_some()
            );
        }
        Err(e) => eprintln!("clustering loss failed: {e}"),
    }
}
