use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnakeError>;

#[derive(Debug, Error)]
pub enum SnakeError {
    /// Board dimensions or hyperparameters that cannot produce a working setup.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Persisted model missing, corrupt or built for another architecture.
    #[error("failed to load model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("replay buffer holds {available} transitions, {requested} requested")]
    InsufficientData { available: usize, requested: usize },

    #[error("no empty cell left on the board")]
    NoEmptyCell,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SnakeError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SnakeError::Configuration(message.into())
    }

    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SnakeError::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
