//! Hyper-parameter grids and their expansion into concrete estimator settings.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{EstimatorKind, EstimatorParams};
use crate::error::{LabelerError, Result};

/// One hyper-parameter value as it appears in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// "No limit", e.g. an unbounded tree depth.
    Null,
    Int(i64),
    Float(f64),
}

impl ParamValue {
    fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(v) => Some(v as f64),
            ParamValue::Float(v) => Some(v),
            ParamValue::Null => None,
        }
    }

    fn as_usize(&self) -> Option<usize> {
        match *self {
            ParamValue::Int(v) => usize::try_from(v).ok(),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<Option<usize>> for ParamValue {
    fn from(value: Option<usize>) -> Self {
        value.map_or(ParamValue::Null, ParamValue::from)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("None"),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Named value lists. Keys are kept sorted so expansion order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    params: BTreeMap<String, Vec<ParamValue>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.params.insert(name.into(), values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Cartesian product of the value lists. The last key (in sorted order)
    /// varies fastest. An empty grid yields a single empty combination; a
    /// key with no values yields none.
    pub fn combinations(&self) -> Vec<BTreeMap<String, ParamValue>> {
        let mut combos = vec![BTreeMap::new()];
        for (name, values) in &self.params {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.insert(name.clone(), *value);
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
    }
}

/// An estimator family together with the grid searched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: EstimatorKind,
    pub grid: ParamGrid,
}

impl Candidate {
    pub fn new(kind: EstimatorKind, grid: ParamGrid) -> Self {
        Candidate { kind, grid }
    }

    /// Expand the grid into estimator settings, starting each combination
    /// from the family defaults.
    pub fn params(&self) -> Result<Vec<EstimatorParams>> {
        self.grid
            .combinations()
            .iter()
            .map(|combo| {
                let mut params = EstimatorParams::default_for(self.kind);
                for (name, value) in combo {
                    apply(&mut params, name, value)?;
                }
                Ok(params)
            })
            .collect()
    }
}

fn apply(params: &mut EstimatorParams, name: &str, value: &ParamValue) -> Result<()> {
    let kind = params.kind();
    let bad_value = || {
        LabelerError::invalid(format!(
            "invalid value {} for {} hyper-parameter '{}'",
            value, kind, name
        ))
    };

    match (params, name) {
        (EstimatorParams::LogisticRegression { c, .. }, "C" | "c") => {
            *c = value.as_f64().ok_or_else(bad_value)?;
        }
        (EstimatorParams::LogisticRegression { max_iter, .. }, "max_iter") => {
            *max_iter = value.as_usize().ok_or_else(bad_value)?;
        }
        (EstimatorParams::LogisticRegression { tol, .. }, "tol") => {
            *tol = value.as_f64().ok_or_else(bad_value)?;
        }
        (EstimatorParams::DecisionTree { max_depth, .. }, "max_depth") => {
            *max_depth = match value {
                ParamValue::Null => None,
                other => Some(other.as_usize().ok_or_else(bad_value)?),
            };
        }
        (EstimatorParams::DecisionTree { min_samples_leaf, .. }, "min_samples_leaf") => {
            *min_samples_leaf = value.as_usize().ok_or_else(bad_value)?;
        }
        (EstimatorParams::LinearDiscriminant { shrinkage }, "shrinkage") => {
            *shrinkage = value.as_f64().ok_or_else(bad_value)?;
        }
        _ => {
            return Err(LabelerError::invalid(format!(
                "unknown hyper-parameter '{}' for {}",
                name, kind
            )))
        }
    }
    Ok(())
}
