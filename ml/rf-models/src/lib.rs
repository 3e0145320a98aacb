//! Burn model architectures for RF drone classification.
//!
//! # Model Architectures
//!
//! - [`DenseClassifier`] - Multilayer perceptron with configurable depth and activations
//! - [`DenseClassifierConfig`] - Architecture hyperparameters
//!
//! # Backend Support
//!
//! Models are generic over Burn backends. The aliases cover the common case:
//! - [`CpuBackend`] - `burn-ndarray` for evaluation and prediction
//! - [`TrainBackend`] - `burn-autodiff` over `burn-ndarray` for training
//!
//! # Example
//!
//! ```
//! use burn::tensor::Tensor;
//! use rf_models::{CpuBackend, DenseClassifierConfig};
//!
//! let device = Default::default();
//! let model = DenseClassifierConfig::new(2047, 10).init::<CpuBackend>(&device);
//!
//! if let Ok(model) = model {
//!     let scores = model.forward(Tensor::zeros([1, 2047], &device));
//!     assert_eq!(scores.dims(), [1, 10]);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod backend;
mod classifier;
mod error;

// Re-export model types
pub use classifier::{Activation, DenseClassifier, DenseClassifierConfig};

// Re-export backend utilities
pub use backend::{CpuBackend, TrainBackend, matrix_to_tensor, tensor_to_vec};

// Re-export error types
pub use error::{ModelError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Activation, CpuBackend, DenseClassifier, DenseClassifierConfig, ModelError,
        TrainBackend, matrix_to_tensor, tensor_to_vec,
    };
}
