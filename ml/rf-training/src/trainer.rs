//! Training loop implementation.

use std::time::Instant;

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::prelude::Backend;
use burn::tensor::ElementConversion;
use burn::tensor::backend::AutodiffBackend;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rf_models::{DenseClassifier, matrix_to_tensor, tensor_to_vec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TrainingConfig;
use crate::error::{Result, TrainingError};
use crate::metrics::{EpochMetrics, Evaluation, TrainingMetrics, accuracy, count_correct};
use crate::samples::LabeledSamples;

/// State of a training run.
///
/// # Example
///
/// ```
/// use rf_training::TrainingState;
///
/// let state = TrainingState::new();
/// assert_eq!(state.epoch, 0);
/// assert!(!state.is_finished());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Current epoch (0-indexed).
    pub epoch: usize,

    /// Current batch within epoch.
    pub batch: usize,

    /// Total epochs to run.
    pub total_epochs: usize,

    /// Whether training has finished.
    pub finished: bool,

    /// Accumulated metrics.
    pub metrics: TrainingMetrics,
}

impl Default for TrainingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingState {
    /// Creates a new training state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: 0,
            batch: 0,
            total_epochs: 0,
            finished: false,
            metrics: TrainingMetrics::new(),
        }
    }

    /// Creates a training state for the given config.
    #[must_use]
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            total_epochs: config.epochs,
            finished: config.epochs == 0,
            ..Self::new()
        }
    }

    /// Returns true if training is finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances to the next epoch.
    pub const fn next_epoch(&mut self) {
        self.epoch += 1;
        self.batch = 0;
        if self.epoch >= self.total_epochs {
            self.finished = true;
        }
    }

    /// Advances to the next batch.
    pub const fn next_batch(&mut self) {
        self.batch += 1;
    }

    /// Adds epoch metrics.
    pub fn add_epoch_metrics(&mut self, metrics: EpochMetrics) {
        self.metrics.add_epoch(metrics);
    }
}

/// Trainer for fitting, evaluating and predicting with a [`DenseClassifier`].
///
/// # Example
///
/// ```
/// use rf_training::{Trainer, TrainingConfig};
///
/// let config = TrainingConfig::new(10);
/// let trainer = Trainer::new(config);
///
/// assert_eq!(trainer.config().epochs, 10);
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl Trainer {
    /// Creates a new trainer with the given config.
    #[must_use]
    pub const fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Returns the training configuration.
    #[must_use]
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Creates initial training state.
    #[must_use]
    pub fn initial_state(&self) -> TrainingState {
        TrainingState::from_config(&self.config)
    }

    /// Computes the number of batches for a dataset size.
    #[must_use]
    pub const fn num_batches(&self, dataset_size: usize) -> usize {
        if self.config.batch_size == 0 {
            0
        } else {
            dataset_size.div_ceil(self.config.batch_size)
        }
    }

    /// Gets batch indices for a given batch number.
    ///
    /// Returns (start, end) indices into the dataset.
    #[must_use]
    pub fn batch_indices(&self, batch: usize, dataset_size: usize) -> (usize, usize) {
        let start = batch * self.config.batch_size;
        let end = ((batch + 1) * self.config.batch_size).min(dataset_size);
        (start, end)
    }

    /// Trains `model` on `data` for the configured number of epochs.
    ///
    /// Returns the trained model and per-epoch metrics.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, empty or mismatched data, or a
    /// non-finite loss.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit<B: AutodiffBackend>(
        &self,
        mut model: DenseClassifier<B>,
        data: &LabeledSamples,
        device: &B::Device,
    ) -> Result<(DenseClassifier<B>, TrainingMetrics)> {
        self.config.validate()?;
        if data.is_empty() {
            return Err(TrainingError::dataset("no training samples"));
        }

        let n = data.len();
        let (n_features, n_classes) = (data.n_features(), data.n_classes());
        let learning_rate = self.config.optimizer.learning_rate;
        let loss_fn = self.config.loss;

        let mut optimizer = self.config.adam_config().init::<B, DenseClassifier<B>>();
        let mut rng = self
            .config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        let mut order: Vec<usize> = (0..n).collect();
        let mut state = self.initial_state();

        while !state.is_finished() {
            let started = Instant::now();
            if self.config.shuffle {
                order.shuffle(&mut rng);
            }

            let mut loss_sum = 0.0f64;
            let mut correct = 0usize;

            for batch in 0..self.num_batches(n) {
                let (start, end) = self.batch_indices(batch, n);
                let indices = &order[start..end];
                let (x, y) = data.batch(indices);

                let x = matrix_to_tensor::<B>(x, indices.len(), n_features, device)?;
                let y_host = y.clone();
                let y = matrix_to_tensor::<B>(y, indices.len(), n_classes, device)?;

                let output = model.forward(x);
                let loss = loss_fn.compute(output.clone(), y);
                let loss_value: f32 = loss.clone().into_scalar().elem();
                if !loss_value.is_finite() {
                    return Err(TrainingError::numerical_instability(format!(
                        "{loss_fn} loss is {loss_value} at epoch {}, batch {batch}",
                        state.epoch
                    )));
                }

                let scores = tensor_to_vec(output.detach())?;
                correct += count_correct(&scores, &y_host, n_classes);
                loss_sum += f64::from(loss_value) * indices.len() as f64;

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optimizer.step(learning_rate, model, grads);
                state.next_batch();
            }

            #[allow(clippy::cast_possible_truncation)]
            let epoch_loss = (loss_sum / n as f64) as f32;
            let epoch_accuracy = correct as f32 / n as f32;
            let metrics = EpochMetrics::new(state.epoch, epoch_loss, epoch_accuracy)
                .with_train_time(started.elapsed().as_secs_f32())
                .with_samples(n);

            debug!(
                epoch = state.epoch + 1,
                total = state.total_epochs,
                loss = epoch_loss,
                accuracy = epoch_accuracy,
                "epoch complete"
            );

            state.add_epoch_metrics(metrics);
            state.next_epoch();
        }

        Ok((model, state.metrics))
    }

    /// Predicts class scores for flat `[rows, n_features]` input.
    ///
    /// Runs in batches of the configured size and returns flat
    /// `[rows, classes]` scores.
    ///
    /// # Errors
    ///
    /// Fails if `features` is not a whole number of rows or tensor data
    /// cannot be read back.
    pub fn predict<B: Backend>(
        &self,
        model: &DenseClassifier<B>,
        features: &[f32],
        n_features: usize,
        device: &B::Device,
    ) -> Result<Vec<f32>> {
        if n_features == 0 || features.len() % n_features != 0 {
            return Err(TrainingError::dataset(format!(
                "{} values is not a whole number of {n_features}-feature rows",
                features.len()
            )));
        }

        let rows = features.len() / n_features;
        let mut scores = Vec::new();
        for batch in 0..self.num_batches(rows) {
            let (start, end) = self.batch_indices(batch, rows);
            let x = features[start * n_features..end * n_features].to_vec();
            let x = matrix_to_tensor::<B>(x, end - start, n_features, device)?;
            scores.extend(tensor_to_vec(model.forward(x))?);
        }
        Ok(scores)
    }

    /// Computes loss and accuracy of `model` on `data`.
    ///
    /// # Errors
    ///
    /// Fails if `data` is empty or prediction fails.
    pub fn evaluate<B: Backend>(
        &self,
        model: &DenseClassifier<B>,
        data: &LabeledSamples,
        device: &B::Device,
    ) -> Result<Evaluation> {
        if data.is_empty() {
            return Err(TrainingError::dataset("no evaluation samples"));
        }
        let scores = self.predict(model, data.features(), data.n_features(), device)?;
        self.score::<B>(&scores, data, device)
    }

    /// Computes loss and accuracy for precomputed scores.
    ///
    /// # Errors
    ///
    /// Fails if `scores` does not match the shape of `data`'s targets.
    pub fn score<B: Backend>(
        &self,
        scores: &[f32],
        data: &LabeledSamples,
        device: &B::Device,
    ) -> Result<Evaluation> {
        let rows = data.len();
        let classes = data.n_classes();
        let pred = matrix_to_tensor::<B>(scores.to_vec(), rows, classes, device)?;
        let target = matrix_to_tensor::<B>(data.targets().to_vec(), rows, classes, device)?;
        let loss: f32 = self.config.loss.compute(pred, target).into_scalar().elem();

        Ok(Evaluation {
            loss,
            accuracy: accuracy(scores, data.targets(), classes),
            samples: rows,
        })
    }

    /// Evaluates and predicts in one pass with an autodiff-trained model.
    ///
    /// Uses the model's inner (non-autodiff) backend.
    ///
    /// # Errors
    ///
    /// See [`Trainer::evaluate`].
    pub fn evaluate_trained<B: AutodiffBackend>(
        &self,
        model: &DenseClassifier<B>,
        data: &LabeledSamples,
        device: &B::Device,
    ) -> Result<(Evaluation, Vec<f32>)> {
        if data.is_empty() {
            return Err(TrainingError::dataset("no evaluation samples"));
        }
        let model = model.valid();
        let scores =
            self.predict::<B::InnerBackend>(&model, data.features(), data.n_features(), device)?;
        let evaluation = self.score::<B::InnerBackend>(&scores, data, device)?;
        Ok((evaluation, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizerConfig;
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use rf_models::DenseClassifierConfig;

    type Inner = NdArray<f32>;
    type TestBackend = Autodiff<Inner>;

    /// Two well separated clusters in 4 dimensions.
    fn toy_samples(per_class: usize) -> LabeledSamples {
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..per_class {
            #[allow(clippy::cast_precision_loss)]
            let jitter = (i % 5) as f32 * 0.05;
            features.extend_from_slice(&[1.0 + jitter, 1.0, -1.0, -1.0 - jitter]);
            targets.extend_from_slice(&[1.0, 0.0]);
            features.extend_from_slice(&[-1.0 - jitter, -1.0, 1.0, 1.0 + jitter]);
            targets.extend_from_slice(&[0.0, 1.0]);
        }
        LabeledSamples::new(features, 4, targets, 2).unwrap_or_default()
    }

    fn toy_model<B: Backend>(device: &B::Device) -> DenseClassifier<B> {
        DenseClassifier::new(DenseClassifierConfig::new(4, 2).with_hidden_dim(8), device)
    }

    #[test]
    fn training_state_new() {
        let state = TrainingState::new();
        assert_eq!(state.epoch, 0);
        assert_eq!(state.batch, 0);
        assert!(!state.is_finished());
    }

    #[test]
    fn training_state_from_config() {
        let config = TrainingConfig::new(50);
        let state = TrainingState::from_config(&config);
        assert_eq!(state.total_epochs, 50);
        assert!(!state.is_finished());
    }

    #[test]
    fn training_state_next_epoch() {
        let mut state = TrainingState::new();
        state.total_epochs = 2;
        state.batch = 10;

        state.next_epoch();
        assert_eq!(state.epoch, 1);
        assert_eq!(state.batch, 0);
        assert!(!state.is_finished());

        state.next_epoch();
        assert_eq!(state.epoch, 2);
        assert!(state.is_finished());
    }

    #[test]
    fn trainer_num_batches() {
        let trainer = Trainer::new(TrainingConfig::new(10).with_batch_size(10));

        assert_eq!(trainer.num_batches(100), 10);
        assert_eq!(trainer.num_batches(101), 11);
        assert_eq!(trainer.num_batches(9), 1);
        assert_eq!(trainer.num_batches(0), 0);
    }

    #[test]
    fn trainer_batch_indices() {
        let trainer = Trainer::new(TrainingConfig::new(10).with_batch_size(32));

        assert_eq!(trainer.batch_indices(0, 100), (0, 32));
        assert_eq!(trainer.batch_indices(1, 100), (32, 64));
        assert_eq!(trainer.batch_indices(3, 100), (96, 100)); // Last batch is partial
    }

    #[test]
    fn fit_reduces_loss_on_separable_data() {
        let device = Default::default();
        let config = TrainingConfig::new(30)
            .with_batch_size(4)
            .with_optimizer(OptimizerConfig::adam(1e-2))
            .with_seed(7);
        let trainer = Trainer::new(config);
        let data = toy_samples(20);

        let result = trainer.fit(toy_model::<TestBackend>(&device), &data, &device);
        assert!(result.is_ok(), "{result:?}");
        let Ok((_, metrics)) = result else { return };

        assert_eq!(metrics.epochs_completed(), 30);
        assert!(metrics.final_loss() < metrics.initial_loss());
        assert!(metrics.epoch_metrics.iter().all(|m| m.train_samples == 40));
    }

    #[test]
    fn fit_then_evaluate_and_predict() {
        let device = Default::default();
        let config = TrainingConfig::new(40)
            .with_batch_size(8)
            .with_optimizer(OptimizerConfig::adam(1e-2))
            .with_seed(3);
        let trainer = Trainer::new(config);
        let data = toy_samples(16);

        let Ok((model, _)) = trainer.fit(toy_model::<TestBackend>(&device), &data, &device) else {
            panic!("training should succeed");
        };

        let evaluated = trainer.evaluate_trained(&model, &data, &device);
        assert!(evaluated.is_ok());
        let Ok((evaluation, scores)) = evaluated else { return };

        assert_eq!(evaluation.samples, 32);
        assert_eq!(scores.len(), 64);
        assert!(evaluation.loss.is_finite());
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn fit_rejects_empty_data() {
        let device = Default::default();
        let trainer = Trainer::new(TrainingConfig::new(1));
        let empty = LabeledSamples::new(vec![], 4, vec![], 2).unwrap_or_default();
        let result = trainer.fit(toy_model::<TestBackend>(&device), &empty, &device);
        assert!(matches!(result, Err(TrainingError::Dataset(_))));
    }

    #[test]
    fn fit_rejects_invalid_config() {
        let device = Default::default();
        let trainer = Trainer::new(TrainingConfig::new(0));
        let result = trainer.fit(toy_model::<TestBackend>(&device), &toy_samples(2), &device);
        assert!(matches!(result, Err(TrainingError::InvalidConfig(_))));
    }

    #[test]
    fn predict_batches_match_single_pass() {
        let device = Default::default();
        let model = toy_model::<Inner>(&device);
        let data = toy_samples(7);

        let small = Trainer::new(TrainingConfig::new(1).with_batch_size(3));
        let large = Trainer::new(TrainingConfig::new(1).with_batch_size(100));

        let a = small
            .predict(&model, data.features(), 4, &device)
            .unwrap_or_default();
        let b = large
            .predict(&model, data.features(), 4, &device)
            .unwrap_or_default();

        assert_eq!(a.len(), 28);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn predict_rejects_partial_rows() {
        let device = Default::default();
        let model = toy_model::<Inner>(&device);
        let trainer = Trainer::default();
        assert!(trainer.predict(&model, &[1.0, 2.0, 3.0], 4, &device).is_err());
    }

    #[test]
    fn score_uses_argmax_accuracy() {
        let device = Default::default();
        let trainer = Trainer::default();
        let data = LabeledSamples::new(vec![0.0; 4], 2, vec![1.0, 0.0, 0.0, 1.0], 2)
            .unwrap_or_default();

        let eval = trainer.score::<Inner>(&[0.9, 0.1, 0.8, 0.2], &data, &device);
        assert!(eval.is_ok());
        let Ok(eval) = eval else { return };
        assert!((eval.accuracy - 0.5).abs() < 1e-6);
        // mse: (0.01 + 0.01 + 0.64 + 0.64) / 4
        assert!((eval.loss - 0.325).abs() < 1e-5);
    }

    #[test]
    fn fit_with_gradient_clipping() {
        let device = Default::default();
        let config = TrainingConfig::new(30)
            .with_batch_size(4)
            .with_optimizer(OptimizerConfig::adam(1e-2))
            .with_gradient_clip(1.0)
            .with_seed(7);
        let trainer = Trainer::new(config);

        let result = trainer.fit(toy_model::<TestBackend>(&device), &toy_samples(20), &device);
        assert!(result.is_ok(), "{result:?}");
        let Ok((_, metrics)) = result else { return };

        assert_eq!(metrics.epochs_completed(), 30);
        assert!(metrics.final_loss().is_finite());
        assert!(metrics.final_loss() < metrics.initial_loss());
    }

    #[test]
    fn evaluate_zero_input_scores_half() {
        // Zero input with zero biases gives sigmoid(0) = 0.5 for every class.
        let device = Default::default();
        let model = toy_model::<Inner>(&device);
        let trainer = Trainer::new(TrainingConfig::new(1).with_batch_size(2));
        let data = LabeledSamples::new(vec![0.0; 12], 4, vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0], 2)
            .unwrap_or_default();

        let eval = trainer.evaluate(&model, &data, &device);
        assert!(eval.is_ok(), "{eval:?}");
        let Ok(eval) = eval else { return };

        assert_eq!(eval.samples, 3);
        // ties pick class 0, which matches rows 0 and 2
        assert!((eval.accuracy - 2.0 / 3.0).abs() < 1e-6);
        // every squared error is 0.25
        assert!((eval.loss - 0.25).abs() < 1e-6);
    }

    #[test]
    fn evaluate_rejects_empty_data() {
        let device = Default::default();
        let model = toy_model::<Inner>(&device);
        let empty = LabeledSamples::new(vec![], 4, vec![], 2).unwrap_or_default();
        let result = Trainer::default().evaluate(&model, &empty, &device);
        assert!(matches!(result, Err(TrainingError::Dataset(_))));
    }
}
