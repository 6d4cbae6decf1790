mod common;

use labeler::preprocessing::StandardScaler;
use ndarray::{array, Axis};

#[test]
fn scaled_training_rows_have_zero_mean_and_unit_variance() {
    let data = common::iris();
    let (scaler, scaled) = StandardScaler::fit_transform(&data.x).unwrap();
    assert_eq!(scaler.n_features(), 4);

    for column in scaled.axis_iter(Axis(1)) {
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12, "mean {}", mean);
        assert!((var - 1.0).abs() < 1e-9, "variance {}", var);
    }
}

#[test]
fn constant_feature_produces_no_nan() {
    let x = array![[1.0, 5.0, -2.0], [2.0, 5.0, -2.0], [3.0, 5.0, -2.0]];
    let (scaler, scaled) = StandardScaler::fit_transform(&x).unwrap();

    assert!(scaled.iter().all(|v| v.is_finite()));
    assert_eq!(scaler.scale[1], 1.0);
    assert_eq!(scaler.scale[2], 1.0);
    assert!(scaled.column(1).iter().all(|&v| v == 0.0));
}

#[test]
fn transform_reuses_training_statistics() {
    let train = array![[0.0], [2.0]];
    let scaler = StandardScaler::fit(&train).unwrap();
    let scaled = scaler.transform(&array![[4.0]]).unwrap();
    assert_eq!(scaled[(0, 0)], 3.0);
}

#[test]
fn non_finite_training_values_are_rejected() {
    let x = array![[1.0, f64::INFINITY], [2.0, 3.0]];
    assert!(StandardScaler::fit(&x).is_err());
}
