mod common;

use std::collections::HashSet;
use std::fs;

use labeler::config::DataConfig;
use labeler::data_handling::{stratified_split, Dataset};
use labeler::error::LabelerError;
use labeler::io::read_dataset;

#[test]
fn split_is_disjoint_and_covers_every_row() {
    let data = common::iris();
    let split = stratified_split(&data, 100, 0.2, 7).unwrap();

    let train: HashSet<usize> = split.train_indices.iter().copied().collect();
    let test: HashSet<usize> = split.test_indices.iter().copied().collect();
    assert!(train.is_disjoint(&test));
    assert_eq!(train.len() + test.len(), data.n_samples());
    assert_eq!(split.train.n_samples(), 24);
    assert_eq!(split.test.n_samples(), 6);
}

#[test]
fn split_preserves_class_proportions() {
    let data = common::iris();
    let split = stratified_split(&data, 15, 0.2, 1).unwrap();

    assert_eq!(split.train.n_samples(), 15);
    assert_eq!(split.train.class_counts(), vec![5, 5, 5]);
    assert_eq!(split.test.class_counts(), vec![5, 5, 5]);
}

#[test]
fn split_is_reproducible_for_a_seed() {
    let data = common::iris();
    let a = stratified_split(&data, 12, 0.2, 99).unwrap();
    let b = stratified_split(&data, 12, 0.2, 99).unwrap();
    assert_eq!(a.train_indices, b.train_indices);
    assert_eq!(a.test_indices, b.test_indices);
}

#[test]
fn starved_class_is_insufficient_data() {
    let mut rows: Vec<([f64; 4], &str)> = common::IRIS[..10].to_vec();
    rows.push(([7.0, 3.2, 4.7, 1.4], "versicolor"));
    let data = common::dataset_from(&rows);

    match stratified_split(&data, 5, 0.2, 3) {
        Err(LabelerError::InsufficientData { class }) => assert_eq!(class, "versicolor"),
        other => panic!("expected InsufficientData, got {:?}", other.map(|s| s.train_indices)),
    }
}

#[test]
fn empty_dataset_is_data_unavailable() {
    let data = Dataset::from_rows::<&str>(&[], &[], common::feature_names()).unwrap();
    assert!(matches!(
        stratified_split(&data, 10, 0.2, 0),
        Err(LabelerError::DataUnavailable(_))
    ));
}

#[test]
fn reads_csv_with_label_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_iris_csv(dir.path());

    let data = read_dataset(&path, &DataConfig::default()).unwrap();
    assert_eq!(data.n_samples(), 30);
    assert_eq!(data.n_features(), 4);
    assert_eq!(data.classes, vec!["setosa", "versicolor", "virginica"]);
    assert_eq!(data.feature_names, common::feature_names());
}

#[test]
fn missing_file_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_dataset(dir.path().join("nope.csv"), &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LabelerError::DataUnavailable(_)));
}

#[test]
fn header_only_file_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "a,b,species\n").unwrap();
    let err = read_dataset(&path, &DataConfig::default()).unwrap_err();
    assert!(matches!(err, LabelerError::DataUnavailable(_)));
}

#[test]
fn non_finite_cell_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nan.csv");
    fs::write(&path, "a,b,species\n1.0,2.0,x\n3.0,NaN,y\n").unwrap();

    match read_dataset(&path, &DataConfig::default()) {
        Err(LabelerError::DataUnavailable(msg)) => {
            assert!(msg.contains("row 2") && msg.contains("'b'"), "{}", msg)
        }
        other => panic!("expected DataUnavailable, got {:?}", other.map(|d| d.n_samples())),
    }
}

#[test]
fn uneven_classes_get_proportional_quotas() {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (label, count) in [("a", 12), ("b", 6), ("c", 3)] {
        for i in 0..count {
            x.push(vec![i as f64, count as f64]);
            y.push(label);
        }
    }
    let data = Dataset::from_rows(&x, &y, vec!["i".to_string(), "n".to_string()]).unwrap();
    let counts = data.class_counts();
    assert_eq!(counts, vec![12, 6, 3]);

    for (max_samples, seed) in [(7, 0), (7, 11), (10, 3), (16, 5)] {
        let split = stratified_split(&data, max_samples, 0.2, seed).unwrap();
        let train = split.train.class_counts();
        assert_eq!(train.iter().sum::<usize>(), max_samples);

        for (k, &count) in counts.iter().enumerate() {
            let proportional = count as f64 * max_samples as f64 / 21.0;
            assert!(
                (train[k] as f64 - proportional).abs() <= 1.0,
                "class {} got {} rows, expected about {:.2} of {}",
                k,
                train[k],
                proportional,
                max_samples
            );
            assert_eq!(train[k] + split.test.class_counts()[k], count);
        }
    }

    let split = stratified_split(&data, 7, 0.2, 0).unwrap();
    assert_eq!(split.train.class_counts(), vec![4, 2, 1]);
}
