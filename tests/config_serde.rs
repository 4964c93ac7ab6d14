//! Loading clustering-loss configuration through serde.
//!
//! Run with `cargo test --features serde`.

#![cfg(feature = "serde")]

use cluster_loss::{ClusteringLossConfig, LossError, LossStrategy, DEFAULT_WEIGHT};

#[test]
fn test_config_from_json() {
    let config: ClusteringLossConfig =
        serde_json::from_str(r#"{ "strategy": "k_means", "weight": 0.25 }"#).unwrap();
    assert_eq!(
        config,
        ClusteringLossConfig {
            strategy: LossStrategy::KMeans,
            weight: 0.25,
        }
    );
    assert!(config.build().is_ok());
}

#[test]
fn test_missing_fields_take_defaults() {
    let config: ClusteringLossConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.strategy, LossStrategy::KMeans);
    assert_eq!(config.weight, DEFAULT_WEIGHT);
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let parsed: Result<ClusteringLossConfig, _> =
        serde_json::from_str(r#"{ "strategy": "energy_based" }"#);
    assert!(parsed.is_err());
}

#[test]
fn test_negative_weight_parses_but_fails_to_build() {
    let config: ClusteringLossConfig = serde_json::from_str(r#"{ "weight": -2.0 }"#).unwrap();
    assert!(matches!(
        config.build(),
        Err(LossError::InvalidWeight { weight }) if weight == -2.0
    ));
}

#[test]
fn test_round_trip_preserves_config() {
    let config = ClusteringLossConfig {
        strategy: LossStrategy::KMeans,
        weight: 1.5,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"k_means\""));
    let restored: ClusteringLossConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}
