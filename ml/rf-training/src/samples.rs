//! Host-side feature/target pairs fed to the trainer.

use rf_dataset::{OneHot, RfDataset};

use crate::error::{Result, TrainingError};

/// Row-major features paired with one-hot targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabeledSamples {
    features: Vec<f32>,
    targets: Vec<f32>,
    n_features: usize,
    n_classes: usize,
}

impl LabeledSamples {
    /// Wraps flat feature and target buffers.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::Dataset`] if the buffers do not describe
    /// the same number of rows.
    pub fn new(
        features: Vec<f32>,
        n_features: usize,
        targets: Vec<f32>,
        n_classes: usize,
    ) -> Result<Self> {
        if n_features == 0 || n_classes == 0 {
            return Err(TrainingError::dataset(
                "feature and class counts must be > 0",
            ));
        }
        if features.len() % n_features != 0 || targets.len() % n_classes != 0 {
            return Err(TrainingError::dataset(format!(
                "buffer lengths {} / {} are not multiples of {n_features} / {n_classes}",
                features.len(),
                targets.len()
            )));
        }
        if features.len() / n_features != targets.len() / n_classes {
            return Err(TrainingError::dataset(format!(
                "{} feature rows but {} target rows",
                features.len() / n_features,
                targets.len() / n_classes
            )));
        }
        Ok(Self {
            features,
            targets,
            n_features,
            n_classes,
        })
    }

    /// Selects `indices` from a dataset and its one-hot targets.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::Dataset`] if the targets do not cover
    /// every dataset sample.
    pub fn gather(dataset: &RfDataset, targets: &OneHot, indices: &[usize]) -> Result<Self> {
        if targets.rows() != dataset.n_samples() {
            return Err(TrainingError::dataset(format!(
                "{} samples but {} target rows",
                dataset.n_samples(),
                targets.rows()
            )));
        }
        Self::new(
            dataset.gather(indices),
            dataset.n_features(),
            targets.gather(indices),
            targets.classes(),
        )
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len() / self.n_features.max(1)
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Features per sample.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes.
    #[must_use]
    pub const fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Flat features `[len, n_features]`.
    #[must_use]
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Flat targets `[len, n_classes]`.
    #[must_use]
    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    /// Copies the selected rows into `(features, targets)` buffers.
    #[must_use]
    pub fn batch(&self, indices: &[usize]) -> (Vec<f32>, Vec<f32>) {
        let mut x = Vec::with_capacity(indices.len() * self.n_features);
        let mut y = Vec::with_capacity(indices.len() * self.n_classes);
        for &i in indices {
            x.extend_from_slice(&self.features[i * self.n_features..(i + 1) * self.n_features]);
            y.extend_from_slice(&self.targets[i * self.n_classes..(i + 1) * self.n_classes]);
        }
        (x, y)
    }
}
