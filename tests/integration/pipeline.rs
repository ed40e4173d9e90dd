//! End-to-end pipeline tests: build → train → persist → predict.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use uuid::Uuid;

use thunderwatch::pipeline::{label, DatasetBuilder, Predictor, Trainer, TrainerConfig};
use thunderwatch::storage;
use thunderwatch::types::{RiskLevel, ThunderError, WeatherReading};

use crate::mock_source::{locations, Climate, MockSource};

fn temp_model_dir() -> PathBuf {
    std::env::temp_dir().join(format!("thunderwatch_it_models_{}", Uuid::new_v4()))
}

fn trainer_config(dir: &PathBuf) -> TrainerConfig {
    TrainerConfig {
        n_trees: 30,
        model_dir: dir.clone(),
        ..TrainerConfig::default()
    }
}

fn cleanup(dir: &PathBuf) {
    storage::delete_artifacts(dir).unwrap();
    let _ = std::fs::remove_dir(dir);
}

/// Fraction of `readings` on which the model agrees with `expected`.
fn agreement(predictor: &Predictor, readings: &[WeatherReading], expected: RiskLevel) -> f64 {
    let hits = readings
        .iter()
        .filter(|r| predictor.predict(r).unwrap().risk_level == expected)
        .count();
    hits as f64 / readings.len() as f64
}

#[tokio::test]
async fn test_dataset_shape_and_skips() {
    let source = MockSource::new(Climate::Mixed);
    let locs = locations(5);
    source.fail_at(locs[1].latitude, locs[1].longitude);

    let ds = DatasetBuilder::new(&source).build(&locs).await;
    // Four surviving locations, each current + 24 of 30 forecast hours.
    assert_eq!(ds.len(), 4 * 25);
    assert_eq!(source.calls().len(), 5);
    assert!(ds.samples().iter().all(|s| s.risk == label(&s.reading)));
}

#[tokio::test]
async fn test_full_pipeline() {
    let dir = temp_model_dir();
    let source = MockSource::new(Climate::Mixed);
    let ds = DatasetBuilder::new(&source).build(&locations(60)).await;
    assert_eq!(ds.len(), 1500);
    assert_eq!(ds.class_counts().len(), 3);

    let outcome = Trainer::new(trainer_config(&dir)).train(&ds).unwrap();
    assert_eq!(outcome.test_size, 300);
    assert!(outcome.accuracy > 0.85, "holdout accuracy {}", outcome.accuracy);

    // In-memory and reloaded artifacts give bit-identical results.
    let in_memory = Predictor::new(outcome.artifacts.clone()).unwrap();
    let reloaded = Predictor::load(&dir).unwrap();
    assert_eq!(reloaded.artifacts().fingerprint(), outcome.artifacts.fingerprint());

    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50 {
        let reading = WeatherReading::new(
            rng.gen_range(10.0..35.0),
            rng.gen_range(50.0..100.0),
            rng.gen_range(0.0..35.0),
            rng.gen_range(995.0..1030.0),
            rng.gen_range(0.0..8.0),
        );
        let a = in_memory.predict(&reading).unwrap();
        let b = reloaded.predict(&reading).unwrap();
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.probability.to_bits(), b.probability.to_bits());
        assert_eq!(a.message, b.message);
    }

    cleanup(&dir);
}

#[tokio::test]
async fn test_model_tracks_rule_on_fresh_readings() {
    let dir = temp_model_dir();
    let source = MockSource::new(Climate::Mixed);
    let ds = DatasetBuilder::new(&source).build(&locations(60)).await;
    let predictor = Predictor::new(Trainer::new(trainer_config(&dir)).train(&ds).unwrap().artifacts).unwrap();

    let mut rng = StdRng::seed_from_u64(77);
    let mut agree = 0;
    let total = 400;
    for _ in 0..total {
        let reading = WeatherReading::new(
            rng.gen_range(10.0..35.0),
            rng.gen_range(50.0..100.0),
            rng.gen_range(0.0..35.0),
            rng.gen_range(995.0..1030.0),
            rng.gen_range(0.0..8.0),
        );
        if predictor.predict(&reading).unwrap().risk_level == label(&reading) {
            agree += 1;
        }
    }
    assert!(agree as f64 / total as f64 > 0.85, "agreement {agree}/{total}");

    cleanup(&dir);
}

#[tokio::test]
async fn test_near_scenario_tends_green() {
    // Around {25, 80, 15, 1015, 2.5}: humid and wet enough for yellow but
    // too little wind, so the rule says green.
    let dir = temp_model_dir();
    let source = MockSource::new(Climate::Mixed);
    let ds = DatasetBuilder::new(&source).build(&locations(60)).await;
    let predictor = Predictor::new(Trainer::new(trainer_config(&dir)).train(&ds).unwrap().artifacts).unwrap();

    let mut rng = StdRng::seed_from_u64(15);
    let near: Vec<WeatherReading> = (0..200)
        .map(|_| {
            WeatherReading::new(
                rng.gen_range(22.0..28.0),
                rng.gen_range(72.0..80.0),
                rng.gen_range(3.0..12.0),
                rng.gen_range(1010.0..1020.0),
                rng.gen_range(2.2..3.8),
            )
        })
        .collect();
    assert!(near.iter().all(|r| label(r) == RiskLevel::Green));
    let share = agreement(&predictor, &near, RiskLevel::Green);
    assert!(share >= 0.7, "green share near scenario {share}");

    let scenario = predictor
        .predict(&WeatherReading::new(25.0, 80.0, 15.0, 1015.0, 2.5))
        .unwrap();
    assert!((0.0..=100.0).contains(&scenario.probability));
    assert_eq!(scenario.message, scenario.risk_level.message());

    cleanup(&dir);
}

#[tokio::test]
async fn test_same_seed_same_classifier() {
    let source = MockSource::new(Climate::Mixed);
    let ds = DatasetBuilder::new(&source).build(&locations(12)).await;

    let dir_a = temp_model_dir();
    let dir_b = temp_model_dir();
    let a = Trainer::new(trainer_config(&dir_a)).train(&ds).unwrap();
    let b = Trainer::new(trainer_config(&dir_b)).train(&ds).unwrap();

    assert_eq!(a.artifacts.scaler(), b.artifacts.scaler());
    assert_eq!(a.artifacts.classifier(), b.artifacts.classifier());
    assert_eq!(a.accuracy, b.accuracy);
    assert_ne!(a.artifacts.fingerprint(), b.artifacts.fingerprint());

    cleanup(&dir_a);
    cleanup(&dir_b);
}

#[tokio::test]
async fn test_single_class_run_writes_nothing() {
    let dir = temp_model_dir();
    let source = MockSource::new(Climate::Calm);
    let ds = DatasetBuilder::new(&source).build(&locations(4)).await;
    assert_eq!(ds.class_counts().keys().copied().collect::<Vec<_>>(), vec![RiskLevel::Green]);

    let err = Trainer::new(trainer_config(&dir)).train(&ds).unwrap_err();
    assert!(matches!(err, ThunderError::InsufficientData(_)));
    assert!(!dir.exists());
    assert!(matches!(Predictor::load(&dir), Err(ThunderError::ModelMismatch(_))));
}

#[tokio::test]
async fn test_all_locations_failing_is_insufficient() {
    let dir = temp_model_dir();
    let source = MockSource::new(Climate::Mixed);
    let locs = locations(3);
    for loc in &locs {
        source.fail_at(loc.latitude, loc.longitude);
    }
    let ds = DatasetBuilder::new(&source).build(&locs).await;
    assert!(ds.is_empty());
    let err = Trainer::new(trainer_config(&dir)).train(&ds).unwrap_err();
    assert!(matches!(err, ThunderError::InsufficientData(_)));
}
