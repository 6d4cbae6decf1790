//! Run configuration.
//!
//! A `LabelerConfig` is built once at process start, either from a single JSON
//! file or from a `conf/` directory holding `models.json` and `design.json`,
//! and is then passed by reference to the loader, the splitter and the grid
//! search.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::metrics::Scoring;
use crate::model_selection::grid::{Candidate, ParamGrid, ParamValue};

/// Estimator families the selector can choose between.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    LogisticRegression,
    DecisionTree,
    LinearDiscriminant,
}

impl EstimatorKind {
    pub const ALL: [EstimatorKind; 3] = [
        EstimatorKind::LogisticRegression,
        EstimatorKind::DecisionTree,
        EstimatorKind::LinearDiscriminant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::LogisticRegression => "logistic_regression",
            EstimatorKind::DecisionTree => "decision_tree",
            EstimatorKind::LinearDiscriminant => "linear_discriminant",
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic_regression" | "logistic" | "lr" => Ok(EstimatorKind::LogisticRegression),
            "decision_tree" | "tree" => Ok(EstimatorKind::DecisionTree),
            "linear_discriminant" | "lda" => Ok(EstimatorKind::LinearDiscriminant),
            _ => Err(format!(
                "Unknown estimator kind: {}. Valid options are: logistic_regression, decision_tree, linear_discriminant",
                s
            )),
        }
    }
}

/// Concrete hyper-parameters for one estimator kind.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum EstimatorParams {
    LogisticRegression {
        /// Inverse of the L2 regularisation strength.
        c: f64,
        max_iter: usize,
        tol: f64,
    },
    DecisionTree {
        max_depth: Option<usize>,
        min_samples_leaf: usize,
    },
    LinearDiscriminant {
        /// Blend factor toward a scaled identity covariance, in [0, 1].
        shrinkage: f64,
    },
}

impl EstimatorParams {
    pub fn default_for(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::LogisticRegression => EstimatorParams::LogisticRegression {
                c: 1.0,
                max_iter: 1000,
                tol: 1e-6,
            },
            EstimatorKind::DecisionTree => EstimatorParams::DecisionTree {
                max_depth: None,
                min_samples_leaf: 1,
            },
            EstimatorKind::LinearDiscriminant => {
                EstimatorParams::LinearDiscriminant { shrinkage: 0.0 }
            }
        }
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            EstimatorParams::LogisticRegression { .. } => EstimatorKind::LogisticRegression,
            EstimatorParams::DecisionTree { .. } => EstimatorKind::DecisionTree,
            EstimatorParams::LinearDiscriminant { .. } => EstimatorKind::LinearDiscriminant,
        }
    }
}

impl Default for EstimatorParams {
    fn default() -> Self {
        EstimatorParams::default_for(EstimatorKind::LogisticRegression)
    }
}

impl fmt::Display for EstimatorParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorParams::LogisticRegression { c, max_iter, tol } => {
                write!(f, "logistic_regression(C={}, max_iter={}, tol={})", c, max_iter, tol)
            }
            EstimatorParams::DecisionTree {
                max_depth,
                min_samples_leaf,
            } => match max_depth {
                Some(depth) => write!(
                    f,
                    "decision_tree(max_depth={}, min_samples_leaf={})",
                    depth, min_samples_leaf
                ),
                None => write!(
                    f,
                    "decision_tree(max_depth=None, min_samples_leaf={})",
                    min_samples_leaf
                ),
            },
            EstimatorParams::LinearDiscriminant { shrinkage } => {
                write!(f, "linear_discriminant(shrinkage={})", shrinkage)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Accept either a scalar setting or a list of values to search over.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Hyper-parameter grids for the candidate estimators (`models.json`).
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ModelsConfig {
    #[serde(rename = "regression_C", deserialize_with = "one_or_many")]
    pub regression_c: Vec<f64>,
    #[serde(deserialize_with = "one_or_many")]
    pub tree_max_depth: Vec<Option<usize>>,
    #[serde(deserialize_with = "one_or_many")]
    pub tree_min_samples_leaf: Vec<usize>,
    #[serde(deserialize_with = "one_or_many")]
    pub lda_shrinkage: Vec<f64>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            regression_c: vec![0.1, 1.0, 10.0],
            tree_max_depth: vec![Some(3), Some(5), None],
            tree_min_samples_leaf: vec![1, 3, 5],
            lda_shrinkage: vec![0.0],
        }
    }
}

impl ModelsConfig {
    /// Candidates in search order: logistic regression, decision tree, LDA.
    pub fn candidates(&self) -> Vec<Candidate> {
        let regression = ParamGrid::new().with(
            "C",
            self.regression_c.iter().copied().map(ParamValue::from).collect(),
        );
        let tree = ParamGrid::new()
            .with(
                "max_depth",
                self.tree_max_depth.iter().copied().map(ParamValue::from).collect(),
            )
            .with(
                "min_samples_leaf",
                self.tree_min_samples_leaf
                    .iter()
                    .copied()
                    .map(ParamValue::from)
                    .collect(),
            );
        let lda = ParamGrid::new().with(
            "shrinkage",
            self.lda_shrinkage.iter().copied().map(ParamValue::from).collect(),
        );

        vec![
            Candidate::new(EstimatorKind::LogisticRegression, regression),
            Candidate::new(EstimatorKind::DecisionTree, tree),
            Candidate::new(EstimatorKind::LinearDiscriminant, lda),
        ]
    }
}

/// Cross-validation and sampling settings (`design.json`).
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DesignConfig {
    /// Number of cross-validation folds.
    pub cv: usize,
    pub scoring: Scoring,
    /// Maximum number of rows drawn into the training split.
    pub n_samples: usize,
    /// Held-out fraction used when `n_samples` would consume every row.
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            cv: 5,
            scoring: Scoring::Accuracy,
            n_samples: 100,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Location and layout of the training table.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
    pub label_column: String,
    /// Feature columns to load, in order. When `None` every non-label column is used.
    pub feature_columns: Option<Vec<String>>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/iris.csv"),
            label_column: "species".to_string(),
            feature_columns: None,
        }
    }
}

/// Central configuration for a training or inference process.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct LabelerConfig {
    pub data: DataConfig,
    pub models: ModelsConfig,
    pub design: DesignConfig,
    /// Where the selected model is persisted.
    pub model_path: PathBuf,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            models: ModelsConfig::default(),
            design: DesignConfig::default(),
            model_path: PathBuf::from("model/labeler.json"),
        }
    }
}

impl LabelerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.design.cv == 0 {
            anyhow::bail!("design.cv must be at least 1 (1 scores on the training rows)");
        }
        if self.design.n_samples == 0 {
            anyhow::bail!("design.n_samples must be positive");
        }
        if !(0.0..1.0).contains(&self.design.test_fraction) {
            anyhow::bail!(
                "design.test_fraction must be in [0, 1), got {}",
                self.design.test_fraction
            );
        }
        if self.data.label_column.trim().is_empty() {
            anyhow::bail!("data.label_column must not be empty");
        }
        Ok(())
    }
}

/// Load a configuration from a JSON file, or from a directory holding
/// `models.json` and `design.json` (plus an optional `data.json`).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LabelerConfig> {
    let path = path.as_ref();
    let config = if path.is_dir() {
        load_config_dir(path)?
    } else {
        read_json::<LabelerConfig>(path)?
    };
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

fn load_config_dir(dir: &Path) -> Result<LabelerConfig> {
    let mut config = LabelerConfig {
        models: read_json(&dir.join("models.json"))?,
        design: read_json(&dir.join("design.json"))?,
        ..LabelerConfig::default()
    };

    let data_path = dir.join("data.json");
    if data_path.exists() {
        #[derive(Deserialize)]
        struct DataSection {
            #[serde(default)]
            data: Option<DataConfig>,
            #[serde(default)]
            model_path: Option<PathBuf>,
        }
        let section: DataSection = read_json(&data_path)?;
        if let Some(data) = section.data {
            config.data = data;
        }
        if let Some(model_path) = section.model_path {
            config.model_path = model_path;
        }
    }

    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(value)
}
