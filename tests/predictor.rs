mod common;

use chrono::Utc;
use labeler::config::EstimatorParams;
use labeler::error::LabelerError;
use labeler::metrics::Scoring;
use labeler::persistence::{ModelStore, PersistedModel};
use labeler::pipeline::Pipeline;
use labeler::predictor::Predictor;

fn trained_store(dir: &std::path::Path) -> ModelStore {
    let data = common::iris();
    let params = EstimatorParams::LinearDiscriminant { shrinkage: 0.1 };
    let mut pipeline = Pipeline::new(params.clone());
    pipeline.fit(&data.x, &data.y).unwrap();

    let store = ModelStore::new(dir.join("labeler.json"));
    store
        .save(&PersistedModel {
            pipeline,
            params,
            classes: data.classes.clone(),
            feature_names: data.feature_names.clone(),
            n_features: data.n_features(),
            cv_score: 1.0,
            test_score: None,
            scoring: Scoring::Accuracy,
            trained_at: Utc::now(),
        })
        .unwrap();
    store
}

#[test]
fn predict_before_training_is_model_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new(ModelStore::new(dir.path().join("labeler.json")));
    let err = predictor.predict(&[5.1, 3.5, 1.4, 0.2]).unwrap_err();
    assert!(matches!(err, LabelerError::ModelUnavailable(_)));
}

#[test]
fn predicts_labels_from_the_stored_class_set() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new(trained_store(dir.path()));

    assert_eq!(predictor.predict(&[5.0, 3.4, 1.5, 0.2]).unwrap(), "setosa");
    assert_eq!(predictor.predict(&[7.1, 3.0, 6.0, 2.3]).unwrap(), "virginica");
}

#[test]
fn wrong_arity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new(trained_store(dir.path()));

    let err = predictor.predict(&[5.1, 3.5, 1.4]).unwrap_err();
    assert!(matches!(
        err,
        LabelerError::FeatureArityMismatch {
            expected: 4,
            actual: 3
        }
    ));
    assert!(predictor.predict(&[5.1, 3.5, 1.4, 0.2, 9.9]).is_err());
}

#[test]
fn non_finite_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::new(trained_store(dir.path()));
    let err = predictor.predict(&[5.1, f64::NAN, 1.4, 0.2]).unwrap_err();
    assert!(matches!(err, LabelerError::InvalidInput(_)));
}

#[test]
fn prediction_does_not_touch_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = trained_store(dir.path());
    let before = std::fs::read(store.path()).unwrap();

    let predictor = Predictor::new(store.clone());
    predictor.predict(&[6.4, 3.2, 4.5, 1.5]).unwrap();

    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}
