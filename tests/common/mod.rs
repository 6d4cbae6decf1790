#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use labeler::data_handling::Dataset;

pub const FEATURES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Ten rows per species from the iris data.
pub const IRIS: [([f64; 4], &str); 30] = [
    ([5.1, 3.5, 1.4, 0.2], "setosa"),
    ([4.9, 3.0, 1.4, 0.2], "setosa"),
    ([4.7, 3.2, 1.3, 0.2], "setosa"),
    ([4.6, 3.1, 1.5, 0.2], "setosa"),
    ([5.0, 3.6, 1.4, 0.2], "setosa"),
    ([5.4, 3.9, 1.7, 0.4], "setosa"),
    ([4.6, 3.4, 1.4, 0.3], "setosa"),
    ([5.0, 3.4, 1.5, 0.2], "setosa"),
    ([4.4, 2.9, 1.4, 0.2], "setosa"),
    ([4.9, 3.1, 1.5, 0.1], "setosa"),
    ([7.0, 3.2, 4.7, 1.4], "versicolor"),
    ([6.4, 3.2, 4.5, 1.5], "versicolor"),
    ([6.9, 3.1, 4.9, 1.5], "versicolor"),
    ([5.5, 2.3, 4.0, 1.3], "versicolor"),
    ([6.5, 2.8, 4.6, 1.5], "versicolor"),
    ([5.7, 2.8, 4.5, 1.3], "versicolor"),
    ([6.3, 3.3, 4.7, 1.6], "versicolor"),
    ([4.9, 2.4, 3.3, 1.0], "versicolor"),
    ([6.6, 2.9, 4.6, 1.3], "versicolor"),
    ([5.2, 2.7, 3.9, 1.4], "versicolor"),
    ([6.3, 3.3, 6.0, 2.5], "virginica"),
    ([5.8, 2.7, 5.1, 1.9], "virginica"),
    ([7.1, 3.0, 5.9, 2.1], "virginica"),
    ([6.3, 2.9, 5.6, 1.8], "virginica"),
    ([6.5, 3.0, 5.8, 2.2], "virginica"),
    ([7.6, 3.0, 6.6, 2.1], "virginica"),
    ([4.9, 2.5, 4.5, 1.7], "virginica"),
    ([7.3, 2.9, 6.3, 1.8], "virginica"),
    ([6.7, 2.5, 5.8, 1.8], "virginica"),
    ([7.2, 3.6, 6.1, 2.5], "virginica"),
];

pub fn feature_names() -> Vec<String> {
    FEATURES.iter().map(|s| s.to_string()).collect()
}

pub fn dataset_from(rows: &[([f64; 4], &str)]) -> Dataset {
    let x: Vec<Vec<f64>> = rows.iter().map(|(r, _)| r.to_vec()).collect();
    let y: Vec<&str> = rows.iter().map(|(_, l)| *l).collect();
    Dataset::from_rows(&x, &y, feature_names()).expect("valid fixture")
}

pub fn iris() -> Dataset {
    dataset_from(&IRIS)
}

/// Write the fixture as `iris.csv` under `dir`.
pub fn write_iris_csv(dir: &Path) -> PathBuf {
    let mut contents = format!("{},species\n", FEATURES.join(","));
    for (row, label) in IRIS.iter() {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        contents.push_str(&format!("{},{}\n", values.join(","), label));
    }
    let path = dir.join("iris.csv");
    fs::write(&path, contents).expect("write fixture");
    path
}
