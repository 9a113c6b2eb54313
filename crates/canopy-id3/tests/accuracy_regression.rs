//! Accuracy regression tests for canopy-id3.
//!
//! These tests verify that algorithmic changes do not degrade tree or
//! ensemble accuracy on a deterministic synthetic categorical dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use canopy_id3::{
    AttributeIndex, Dataset, Evaluation, ForestConfig, OobMode, Prediction, TreeConfig,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic categorical dataset
// ---------------------------------------------------------------------------

/// Generate a 300-record, 10-column, 3-label dataset with the label in column 0.
///
/// Column 1 equals the label. Columns 2-3 copy the label but are replaced by
/// a random value in [0, 3) a quarter of the time. Columns 4-9 are noise in [0, 3).
/// Labels are assigned round-robin.
fn make_records() -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let records = (0..300u32)
        .map(|i| {
            let label = i % 3;
            let mut row = vec![label, label];
            for _ in 2..4 {
                row.push(if rng.gen_bool(0.25) { rng.gen_range(0..3) } else { label });
            }
            for _ in 4..10 {
                row.push(rng.gen_range(0..3));
            }
            row
        })
        .collect();
    Dataset::new(records).unwrap()
}

fn target() -> TreeConfig {
    TreeConfig::new(AttributeIndex::new(0))
}

fn labels(dataset: &Dataset) -> Vec<u32> {
    dataset.records().iter().map(|r| r[0]).collect()
}

// ---------------------------------------------------------------------------
// a) held_out_tree_accuracy
// ---------------------------------------------------------------------------

/// A single tree trained on the first 240 records must classify the last 60 correctly.
#[test]
fn held_out_tree_accuracy() {
    let (train, test) = make_records().split_at(240).unwrap();
    let tree = target().fit(&train).unwrap();
    let predictions = tree.classify_batch(test.records()).unwrap();
    let eval = Evaluation::from_predictions(&labels(&test), &predictions).unwrap();
    assert!(eval.accuracy() > 0.95, "held-out accuracy {}", eval.accuracy());
}

// ---------------------------------------------------------------------------
// b) oob_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// OOB accuracy with 100 trees must exceed 0.80.
#[test]
fn oob_accuracy_above_threshold() {
    let dataset = make_records();
    let result = ForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .with_oob_mode(OobMode::Enabled)
        .fit(&dataset, &target())
        .unwrap();

    let oob = result
        .oob_score()
        .expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.accuracy > 0.80, "oob_accuracy {} <= 0.80", oob.accuracy);
}

// ---------------------------------------------------------------------------
// c) determining_attribute_ranks_first
// ---------------------------------------------------------------------------

/// The column equal to the label must carry the top importance.
#[test]
fn determining_attribute_ranks_first() {
    let dataset = make_records();
    let result = ForestConfig::new(50)
        .unwrap()
        .with_seed(42)
        .fit(&dataset, &target())
        .unwrap();

    let top = &result.importances()[0];
    assert_eq!(top.attribute, AttributeIndex::new(1));
    assert_eq!(top.rank, 1);
    assert_eq!(result.importances().len(), 9);
}

// ---------------------------------------------------------------------------
// d) deterministic_predictions
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical predictions across two independent runs.
#[test]
fn deterministic_predictions() {
    let dataset = make_records();
    let config = ForestConfig::new(100).unwrap().with_seed(42);

    let result1 = config.fit(&dataset, &target()).unwrap();
    let result2 = config.fit(&dataset, &target()).unwrap();

    let preds1 = result1.forest().classify_batch(dataset.records()).unwrap();
    let preds2 = result2.forest().classify_batch(dataset.records()).unwrap();
    assert_eq!(preds1, preds2, "predictions differ across runs with the same seed");
}

// ---------------------------------------------------------------------------
// e) prediction_accuracy_on_training_data
// ---------------------------------------------------------------------------

/// Training accuracy with 100 trees must exceed 0.95.
#[test]
fn prediction_accuracy_on_training_data() {
    let dataset = make_records();
    let result = ForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .fit(&dataset, &target())
        .unwrap();

    let predictions = result.forest().classify_batch(dataset.records()).unwrap();
    let eval = Evaluation::from_predictions(&labels(&dataset), &predictions).unwrap();
    assert!(eval.accuracy() > 0.95, "training accuracy {} <= 0.95", eval.accuracy());
    assert_eq!(eval.n_unclassifiable(), 0);
}

// ---------------------------------------------------------------------------
// f) unseen_value_is_unclassifiable
// ---------------------------------------------------------------------------

/// A value outside the training domain at the root attribute votes `Unclassifiable` everywhere.
#[test]
fn unseen_value_is_unclassifiable() {
    let dataset = make_records();
    let result = ForestConfig::new(20)
        .unwrap()
        .fit(&dataset, &target())
        .unwrap();
    let mut record = dataset.record(0).to_vec();
    record[1] = 7;
    assert_eq!(
        result.forest().classify(&record).unwrap(),
        Prediction::Unclassifiable
    );
}
