//! Training configuration.

use burn::grad_clipping::GradientClippingConfig;
use burn::optim::AdamConfig;
use burn::optim::decay::WeightDecayConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};
use crate::loss::LossFunction;

/// Configuration for a training run.
///
/// # Example
///
/// ```
/// use rf_training::TrainingConfig;
///
/// let config = TrainingConfig::default();
/// assert_eq!(config.epochs, 200);
/// assert_eq!(config.batch_size, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training epochs.
    pub epochs: usize,

    /// Batch size for training and prediction.
    pub batch_size: usize,

    /// Optimizer configuration.
    pub optimizer: OptimizerConfig,

    /// Loss minimized during training.
    pub loss: LossFunction,

    /// Whether to shuffle the training set each epoch.
    pub shuffle: bool,

    /// Gradient norm clipping threshold (0.0 = disabled).
    pub gradient_clip: f32,

    /// Random seed for shuffling and weight initialization.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new(200)
    }
}

impl TrainingConfig {
    /// Creates a new training config with the given epochs.
    #[must_use]
    pub const fn new(epochs: usize) -> Self {
        Self {
            epochs,
            batch_size: 10,
            optimizer: OptimizerConfig::adam(1e-3),
            loss: LossFunction::MeanSquaredError,
            shuffle: true,
            gradient_clip: 0.0,
            seed: Some(1),
        }
    }

    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the optimizer.
    #[must_use]
    pub const fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the loss function.
    #[must_use]
    pub const fn with_loss(mut self, loss: LossFunction) -> Self {
        self.loss = loss;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disables shuffling.
    #[must_use]
    pub const fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Clips gradients to the given L2 norm; `0.0` disables clipping.
    #[must_use]
    pub const fn with_gradient_clip(mut self, max_norm: f32) -> Self {
        self.gradient_clip = max_norm;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `true` if all values are valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates the configuration, naming the first invalid field.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidConfig`].
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(TrainingError::invalid_config("epochs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::invalid_config("batch_size must be > 0"));
        }
        if self.gradient_clip.is_nan() || self.gradient_clip < 0.0 {
            return Err(TrainingError::invalid_config("gradient_clip must be >= 0"));
        }
        if !self.optimizer.is_valid() {
            return Err(TrainingError::invalid_config(format!(
                "invalid optimizer: {:?}",
                self.optimizer
            )));
        }
        Ok(())
    }

    /// Builds the Burn Adam configuration for this run.
    #[must_use]
    pub fn adam_config(&self) -> AdamConfig {
        let config = self.optimizer.to_adam();
        if self.gradient_clip > 0.0 {
            config.with_grad_clipping(Some(GradientClippingConfig::Norm(self.gradient_clip)))
        } else {
            config
        }
    }
}

/// Adam optimizer configuration.
///
/// Defaults follow Keras: learning rate `1e-3`, betas `0.9`/`0.999`,
/// epsilon `1e-7`.
///
/// # Example
///
/// ```
/// use rf_training::OptimizerConfig;
///
/// let adam = OptimizerConfig::adam(1e-3);
/// assert_eq!(adam.learning_rate, 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Learning rate.
    pub learning_rate: f64,

    /// Weight decay (L2 penalty, 0.0 = disabled).
    pub weight_decay: f32,

    /// Exponential decay of the first moment.
    pub beta1: f32,

    /// Exponential decay of the second moment.
    pub beta2: f32,

    /// Epsilon for numerical stability.
    pub epsilon: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::adam(1e-3)
    }
}

impl OptimizerConfig {
    /// Creates an Adam optimizer config.
    #[must_use]
    pub const fn adam(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            weight_decay: 0.0,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }

    /// Sets weight decay.
    #[must_use]
    pub const fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Validates the configuration.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.learning_rate > 0.0
            && self.weight_decay >= 0.0
            && (0.0..1.0).contains(&self.beta1)
            && (0.0..1.0).contains(&self.beta2)
            && self.epsilon > 0.0
    }

    /// Converts to the Burn optimizer config.
    #[must_use]
    pub fn to_adam(&self) -> AdamConfig {
        let config = AdamConfig::new()
            .with_beta_1(self.beta1)
            .with_beta_2(self.beta2)
            .with_epsilon(self.epsilon);
        if self.weight_decay > 0.0 {
            config.with_weight_decay(Some(WeightDecayConfig::new(self.weight_decay)))
        } else {
            config
        }
    }
}
