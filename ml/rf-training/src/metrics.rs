//! Training metrics and evaluation scores.

use rf_dataset::argmax;
use serde::{Deserialize, Serialize};

/// Metrics for a single training epoch.
///
/// # Example
///
/// ```
/// use rf_training::EpochMetrics;
///
/// let metrics = EpochMetrics::new(0, 0.5, 0.8);
/// assert_eq!(metrics.epoch, 0);
/// assert!((metrics.train_loss - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number (0-indexed).
    pub epoch: usize,

    /// Mean training loss over the epoch's batches, weighted by batch size.
    pub train_loss: f32,

    /// Training accuracy over the epoch (0 to 1).
    pub train_accuracy: f32,

    /// Training time in seconds.
    pub train_time_secs: f32,

    /// Number of training samples processed.
    pub train_samples: usize,
}

impl EpochMetrics {
    /// Creates new epoch metrics.
    #[must_use]
    pub const fn new(epoch: usize, train_loss: f32, train_accuracy: f32) -> Self {
        Self {
            epoch,
            train_loss,
            train_accuracy,
            train_time_secs: 0.0,
            train_samples: 0,
        }
    }

    /// Sets the training time.
    #[must_use]
    pub const fn with_train_time(mut self, secs: f32) -> Self {
        self.train_time_secs = secs;
        self
    }

    /// Sets the sample count.
    #[must_use]
    pub const fn with_samples(mut self, train: usize) -> Self {
        self.train_samples = train;
        self
    }
}

/// Aggregate metrics for a training run.
///
/// # Example
///
/// ```
/// use rf_training::{TrainingMetrics, EpochMetrics};
///
/// let mut metrics = TrainingMetrics::new();
/// metrics.add_epoch(EpochMetrics::new(0, 0.5, 0.6));
/// metrics.add_epoch(EpochMetrics::new(1, 0.3, 0.7));
///
/// assert_eq!(metrics.epochs_completed(), 2);
/// assert!((metrics.final_loss() - 0.3).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Metrics for each epoch.
    pub epoch_metrics: Vec<EpochMetrics>,

    /// Lowest training loss seen.
    pub best_loss: Option<f32>,

    /// Epoch with the lowest training loss.
    pub best_epoch: Option<usize>,

    /// Total training time in seconds.
    pub total_time_secs: f32,
}

impl TrainingMetrics {
    /// Creates new empty training metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds metrics for an epoch.
    pub fn add_epoch(&mut self, metrics: EpochMetrics) {
        if self.best_loss.is_none_or(|best| metrics.train_loss < best) {
            self.best_loss = Some(metrics.train_loss);
            self.best_epoch = Some(metrics.epoch);
        }

        self.total_time_secs += metrics.train_time_secs;
        self.epoch_metrics.push(metrics);
    }

    /// Returns the number of completed epochs.
    #[must_use]
    pub fn epochs_completed(&self) -> usize {
        self.epoch_metrics.len()
    }

    /// Returns the final training loss.
    #[must_use]
    pub fn final_loss(&self) -> f32 {
        self.epoch_metrics.last().map_or(f32::NAN, |m| m.train_loss)
    }

    /// Returns the final training accuracy.
    #[must_use]
    pub fn final_accuracy(&self) -> f32 {
        self.epoch_metrics.last().map_or(f32::NAN, |m| m.train_accuracy)
    }

    /// Returns the initial training loss.
    #[must_use]
    pub fn initial_loss(&self) -> f32 {
        self.epoch_metrics.first().map_or(f32::NAN, |m| m.train_loss)
    }
}

/// Loss and accuracy on a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean loss.
    pub loss: f32,

    /// Fraction of samples whose predicted class matches (0 to 1).
    pub accuracy: f32,

    /// Number of samples evaluated.
    pub samples: usize,
}

impl Evaluation {
    /// Accuracy as a percentage.
    #[must_use]
    pub fn accuracy_percent(&self) -> f32 {
        self.accuracy * 100.0
    }
}

/// Counts rows where the argmax of `pred` equals the argmax of `target`.
///
/// Both slices are row-major with `classes` columns.
#[must_use]
pub fn count_correct(pred: &[f32], target: &[f32], classes: usize) -> usize {
    if classes == 0 {
        return 0;
    }
    pred.chunks_exact(classes)
        .zip(target.chunks_exact(classes))
        .filter(|(p, t)| argmax(p) == argmax(t))
        .count()
}

/// Categorical accuracy: fraction of rows with matching argmax.
///
/// Returns 0.0 for empty input.
///
/// # Example
///
/// ```
/// use rf_training::accuracy;
///
/// let pred = [0.9, 0.1, 0.2, 0.8, 0.6, 0.4];
/// let target = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
/// assert!((accuracy(&pred, &target, 2) - 2.0 / 3.0).abs() < 1e-6);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(pred: &[f32], target: &[f32], classes: usize) -> f32 {
    let rows = if classes == 0 { 0 } else { target.len() / classes };
    if rows == 0 {
        return 0.0;
    }
    count_correct(pred, target, classes) as f32 / rows as f32
}

/// Mean and population standard deviation.
///
/// Returns `(0.0, 0.0)` for empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn epoch_metrics_builder() {
        let metrics = EpochMetrics::new(3, 0.2, 0.9)
            .with_train_time(1.5)
            .with_samples(100);
        assert_eq!(metrics.epoch, 3);
        assert_relative_eq!(metrics.train_time_secs, 1.5);
        assert_eq!(metrics.train_samples, 100);
    }

    #[test]
    fn training_metrics_tracks_best() {
        let mut metrics = TrainingMetrics::new();
        metrics.add_epoch(EpochMetrics::new(0, 0.5, 0.5).with_train_time(1.0));
        metrics.add_epoch(EpochMetrics::new(1, 0.2, 0.8).with_train_time(1.0));
        metrics.add_epoch(EpochMetrics::new(2, 0.3, 0.7).with_train_time(1.0));

        assert_eq!(metrics.best_loss, Some(0.2));
        assert_eq!(metrics.best_epoch, Some(1));
        assert_relative_eq!(metrics.total_time_secs, 3.0);
        assert_relative_eq!(metrics.final_accuracy(), 0.7);
        assert_relative_eq!(metrics.initial_loss(), 0.5);
    }

    #[test]
    fn training_metrics_empty() {
        let metrics = TrainingMetrics::new();
        assert_eq!(metrics.epochs_completed(), 0);
        assert!(metrics.final_loss().is_nan());
        assert!(metrics.best_loss.is_none());
    }

    #[test]
    fn accuracy_argmax_based() {
        let pred = [0.2, 0.7, 0.1, 0.5, 0.3, 0.2];
        let target = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        assert_eq!(count_correct(&pred, &target, 3), 1);
        assert_relative_eq!(accuracy(&pred, &target, 3), 0.5);
    }

    #[test]
    fn accuracy_empty() {
        assert_relative_eq!(accuracy(&[], &[], 3), 0.0);
        assert_relative_eq!(accuracy(&[], &[], 0), 0.0);
    }

    #[test]
    fn evaluation_percent() {
        let eval = Evaluation {
            loss: 0.1,
            accuracy: 0.875,
            samples: 8,
        };
        assert_relative_eq!(eval.accuracy_percent(), 87.5);
    }

    #[test]
    fn mean_std_known() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(mean, 5.0);
        assert_relative_eq!(std, 2.0);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn training_metrics_serialization() {
        let mut metrics = TrainingMetrics::new();
        metrics.add_epoch(EpochMetrics::new(0, 0.5, 0.5));
        let json = serde_json::to_string(&metrics);
        assert!(json.is_ok());

        let parsed: std::result::Result<TrainingMetrics, _> =
            serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(metrics));
    }
}
