//! labeler: model selection and inference for tabular classification.
//!
//! A labelled table is loaded and split with stratification, a grid of
//! candidate estimators (logistic regression, decision tree, linear
//! discriminant analysis), each behind a standard scaler, is ranked by
//! stratified cross-validation, and the winner is refitted and persisted as a
//! single JSON artifact. Predictions are served from that artifact.
//!
//! Configuration is an explicit `LabelerConfig` passed into each stage rather
//! than process-wide state.
pub mod commands;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod metrics;
pub mod model_selection;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod predictor;
pub mod preprocessing;

pub use error::{LabelerError, Result};
