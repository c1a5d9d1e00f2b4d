use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("model has not been trained yet")]
    ModelNotTrained,

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("background training stopped: {reason}")]
    TrainingAborted { reason: String },
}

impl EngineError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        EngineError::Configuration {
            reason: reason.into(),
        }
    }

    /// Waiting for training to finish is the only way out of `ModelNotTrained`;
    /// the other kinds need different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ModelNotTrained)
    }
}
