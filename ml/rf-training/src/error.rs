//! Error types for rf-training crate.

use thiserror::Error;

/// Errors that can occur during training.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Invalid training configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dataset error.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Model error.
    #[error("model error: {0}")]
    Model(String),

    /// Numerical instability detected.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Results could not be written.
    #[error("results error: {0}")]
    Results(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl TrainingError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a dataset error.
    #[must_use]
    pub fn dataset(reason: impl Into<String>) -> Self {
        Self::Dataset(reason.into())
    }

    /// Creates a model error.
    #[must_use]
    pub fn model(reason: impl Into<String>) -> Self {
        Self::Model(reason.into())
    }

    /// Creates a numerical instability error.
    #[must_use]
    pub fn numerical_instability(reason: impl Into<String>) -> Self {
        Self::NumericalInstability(reason.into())
    }

    /// Creates a results error.
    #[must_use]
    pub fn results(reason: impl Into<String>) -> Self {
        Self::Results(reason.into())
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io(reason.into())
    }
}

impl From<std::io::Error> for TrainingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrainingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Results(err.to_string())
    }
}

impl From<csv::Error> for TrainingError {
    fn from(err: csv::Error) -> Self {
        Self::Results(err.to_string())
    }
}

impl From<rf_dataset::DatasetError> for TrainingError {
    fn from(err: rf_dataset::DatasetError) -> Self {
        Self::Dataset(err.to_string())
    }
}

impl From<rf_models::ModelError> for TrainingError {
    fn from(err: rf_models::ModelError) -> Self {
        Self::Model(err.to_string())
    }
}

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = TrainingError::invalid_config("batch size must be > 0");
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("batch size"));
    }

    #[test]
    fn error_dataset() {
        let err = TrainingError::dataset("empty dataset");
        assert!(err.to_string().contains("dataset error"));
    }

    #[test]
    fn error_model() {
        let err = TrainingError::model("dimension mismatch");
        assert!(err.to_string().contains("model error"));
    }

    #[test]
    fn error_numerical_instability() {
        let err = TrainingError::numerical_instability("loss is NaN");
        assert!(err.to_string().contains("numerical instability"));
    }

    #[test]
    fn error_results() {
        let err = TrainingError::results("row width mismatch");
        assert!(err.to_string().contains("results error"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: TrainingError = io_err.into();
        assert!(matches!(err, TrainingError::Io(_)));
    }

    #[test]
    fn error_from_dataset_error() {
        let err: TrainingError = rf_dataset::DatasetError::EmptyDataset.into();
        assert!(matches!(err, TrainingError::Dataset(ref m) if m.contains("empty")));
    }

    #[test]
    fn error_from_model_error() {
        let err: TrainingError = rf_models::ModelError::invalid_config("bad").into();
        assert!(matches!(err, TrainingError::Model(_)));
    }
}
