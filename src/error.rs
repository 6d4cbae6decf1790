use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabelerError>;

/// Failures surfaced by training and inference.
#[derive(Debug, Error)]
pub enum LabelerError {
    /// The source dataset is missing, unreadable or empty.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// A class ended up with no rows after sampling.
    #[error("insufficient data: class '{class}' has no rows after sampling")]
    InsufficientData { class: String },

    #[error("no candidates to search")]
    NoCandidates,

    /// Every fit attempt failed; `source` is the first failure seen.
    #[error("training failed after {attempts} failed fit attempts: {source}")]
    TrainingFailed {
        attempts: usize,
        #[source]
        source: Box<LabelerError>,
    },

    #[error("estimator used before it was fitted")]
    NotFitted,

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("expected {expected} feature values, got {actual}")]
    FeatureArityMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LabelerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LabelerError::InvalidInput(msg.into())
    }

    pub fn training_failed(attempts: usize, cause: LabelerError) -> Self {
        LabelerError::TrainingFailed {
            attempts,
            source: Box::new(cause),
        }
    }
}
