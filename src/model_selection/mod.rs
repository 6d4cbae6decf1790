//! Candidate grids, stratified folds and the cross-validated grid search.
pub mod cv;
pub mod grid;
pub mod search;

pub use cv::{Fold, StratifiedKFold};
pub use grid::{Candidate, ParamGrid, ParamValue};
pub use search::{CandidateScore, GridSearch, SelectionResult};
