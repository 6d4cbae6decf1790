use labeler::config::{EstimatorKind, EstimatorParams};
use labeler::models::{Classifier, Estimator};
use ndarray::{Array1, Array2};

#[test]
fn test_factory_builds_and_predicts() {
    // tiny dataset
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let y = Array1::from_vec(vec![1usize, 0, 1, 0, 1, 0]);

    for kind in EstimatorKind::ALL {
        let mut model = Estimator::new(&EstimatorParams::default_for(kind));
        model.fit(&x, &y).expect("fit failed");
        let preds = model.predict(&x).expect("predict failed");
        assert_eq!(preds.len(), x.nrows());
        assert_eq!(preds, y, "{} misclassified separable rows", kind);
    }
}

#[test]
fn test_factory_honours_params() {
    let params = EstimatorParams::DecisionTree {
        max_depth: Some(1),
        min_samples_leaf: 1,
    };
    match Estimator::new(&params) {
        Estimator::DecisionTree(tree) => {
            assert_eq!(tree.max_depth, Some(1));
            assert_eq!(tree.min_samples_leaf, 1);
        }
        other => panic!("unexpected estimator {:?}", other.kind()),
    }
}

#[test]
fn test_estimator_round_trips_through_json() {
    let x = Array2::from_shape_vec((4, 1), vec![0.0, 0.2, 2.0, 2.2]).unwrap();
    let y = Array1::from_vec(vec![0usize, 0, 1, 1]);
    let mut model = Estimator::new(&EstimatorParams::LinearDiscriminant { shrinkage: 0.5 });
    model.fit(&x, &y).unwrap();

    let json = serde_json::to_string(&model).unwrap();
    let restored: Estimator = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.kind(), EstimatorKind::LinearDiscriminant);
    assert_eq!(restored.predict(&x).unwrap(), model.predict(&x).unwrap());
}
