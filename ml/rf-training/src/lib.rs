//! Training infrastructure for RF drone classifiers.
//!
//! # Training
//!
//! - [`Trainer`] - Mini-batch training loop with Adam, plus evaluation and prediction
//! - [`TrainingConfig`] - Epochs, batch size, optimizer and loss settings
//! - [`LossFunction`] - Mean squared error or cross-entropy losses
//!
//! # Cross-Validation
//!
//! - [`CrossValidation`] - Stratified k-fold experiment, one fresh model per fold
//! - [`CrossValidationReport`] - Per-fold accuracy with mean and standard deviation
//! - [`ResultsWriter`] - `Results_{label}{fold}.csv` export
//!
//! # Metrics
//!
//! - [`TrainingMetrics`] / [`EpochMetrics`] - Loss and accuracy per epoch
//! - [`Evaluation`] - Held-out loss and accuracy
//!
//! # Example
//!
//! ```
//! use rf_training::{LossFunction, OptimizerConfig, Trainer, TrainingConfig};
//!
//! let config = TrainingConfig::new(200)
//!     .with_batch_size(10)
//!     .with_optimizer(OptimizerConfig::adam(1e-3))
//!     .with_loss(LossFunction::MeanSquaredError);
//! assert!(config.is_valid());
//!
//! let trainer = Trainer::new(config);
//! assert_eq!(trainer.num_batches(95), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod config;
mod cross_validation;
mod error;
mod loss;
mod metrics;
mod results;
mod samples;
mod trainer;

// Re-export training types
pub use config::{OptimizerConfig, TrainingConfig};
pub use loss::{LossFunction, binary_cross_entropy, categorical_cross_entropy, mse_loss};
pub use samples::LabeledSamples;
pub use trainer::{Trainer, TrainingState};

// Re-export cross-validation types
pub use cross_validation::{CrossValidation, CrossValidationReport, FoldReport};
pub use results::ResultsWriter;

// Re-export metrics
pub use metrics::{
    EpochMetrics, Evaluation, TrainingMetrics, accuracy, count_correct, mean_std,
};

// Re-export error types
pub use error::{Result, TrainingError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CrossValidation, CrossValidationReport, Evaluation, LabeledSamples, LossFunction,
        OptimizerConfig, ResultsWriter, Trainer, TrainingConfig, TrainingError,
        TrainingMetrics,
    };
}
