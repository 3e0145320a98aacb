//! Stratified k-fold cross-validation driver.
//!
//! One fresh model per fold: build, fit on the training indices,
//! evaluate and predict on the held-out indices, write the fold's
//! results file, discard.

use std::path::PathBuf;

use burn::tensor::backend::AutodiffBackend;
use rf_dataset::{DatasetSummary, LabelKind, RfDataset, StratifiedKFold, encode};
use rf_models::DenseClassifierConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TrainingError};
use crate::metrics::mean_std;
use crate::results::ResultsWriter;
use crate::samples::LabeledSamples;
use crate::trainer::Trainer;

/// Outcome of one fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldReport {
    /// Fold number (1-based).
    pub fold: usize,

    /// Training samples used.
    pub train_samples: usize,

    /// Held-out samples evaluated.
    pub test_samples: usize,

    /// Held-out accuracy in percent.
    pub accuracy: f32,

    /// Held-out loss.
    pub loss: f32,

    /// Final training loss.
    pub train_loss: f32,

    /// Final-epoch training accuracy in percent.
    pub train_accuracy: f32,

    /// Results file written for this fold.
    pub results_path: PathBuf,
}

/// Outcome of a full cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    /// Label row classified.
    pub label: LabelKind,

    /// Dataset composition.
    pub summary: DatasetSummary,

    /// Per-fold outcomes, in fold order.
    pub folds: Vec<FoldReport>,

    /// Mean held-out accuracy in percent.
    pub mean_accuracy: f32,

    /// Population standard deviation of held-out accuracy in percent.
    pub std_accuracy: f32,
}

impl CrossValidationReport {
    /// Builds a report, computing the accuracy statistics.
    #[must_use]
    pub fn new(label: LabelKind, summary: DatasetSummary, folds: Vec<FoldReport>) -> Self {
        let scores: Vec<f32> = folds.iter().map(|f| f.accuracy).collect();
        let (mean_accuracy, std_accuracy) = mean_std(&scores);
        Self {
            label,
            summary,
            folds,
            mean_accuracy,
            std_accuracy,
        }
    }

    /// Per-fold accuracy scores in percent.
    #[must_use]
    pub fn scores(&self) -> Vec<f32> {
        self.folds.iter().map(|f| f.accuracy).collect()
    }
}

/// Cross-validation experiment.
///
/// # Example
///
/// ```
/// use rf_dataset::StratifiedKFold;
/// use rf_models::DenseClassifierConfig;
/// use rf_training::{CrossValidation, Trainer, TrainingConfig};
///
/// let cv = CrossValidation::new(
///     StratifiedKFold::default(),
///     DenseClassifierConfig::default(),
///     Trainer::new(TrainingConfig::default()),
///     "results",
/// );
/// assert_eq!(cv.splitter().n_splits, 10);
/// ```
#[derive(Debug, Clone)]
pub struct CrossValidation {
    splitter: StratifiedKFold,
    model: DenseClassifierConfig,
    trainer: Trainer,
    output_dir: PathBuf,
}

impl CrossValidation {
    /// Creates an experiment.
    ///
    /// The model's `input_dim` and `output_dim` are replaced by the
    /// dataset's feature and class counts at run time.
    #[must_use]
    pub fn new(
        splitter: StratifiedKFold,
        model: DenseClassifierConfig,
        trainer: Trainer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            splitter,
            model,
            trainer,
            output_dir: output_dir.into(),
        }
    }

    /// Fold splitter.
    #[must_use]
    pub const fn splitter(&self) -> &StratifiedKFold {
        &self.splitter
    }

    /// Trainer used for every fold.
    #[must_use]
    pub const fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Runs every fold and writes results plus `cv_summary.json`.
    ///
    /// # Errors
    ///
    /// Any dataset, training or IO error aborts the run.
    pub fn run<B: AutodiffBackend>(
        &self,
        dataset: &RfDataset,
        label: LabelKind,
        device: &B::Device,
    ) -> Result<CrossValidationReport> {
        self.trainer.config().validate()?;

        info!(label = %label, "preparing data");
        let labels = dataset.labels(label)?;
        let targets = encode(&labels)?;
        let summary = DatasetSummary::from_labels(&labels, dataset.n_features());
        info!(%summary, balance = summary.balance_ratio(), "dataset ready");

        let folds = self.splitter.split(&targets.decode())?;
        let model_config = self
            .model
            .with_input_dim(dataset.n_features())
            .with_output_dim(targets.classes());
        model_config.validate()?;

        let writer = ResultsWriter::new(&self.output_dir, label.number());
        let mut reports = Vec::with_capacity(folds.len());

        for fold in &folds {
            info!(fold = fold.number(), of = folds.len(), "training fold");

            if let Some(seed) = self.trainer.config().seed {
                B::seed(seed.wrapping_add(fold.index as u64));
            }

            let train = LabeledSamples::gather(dataset, &targets, &fold.train)?;
            let test = LabeledSamples::gather(dataset, &targets, &fold.test)?;
            if test.is_empty() {
                return Err(TrainingError::dataset(format!(
                    "fold {} has no test samples",
                    fold.number()
                )));
            }

            let model = model_config.init::<B>(device)?;
            let (model, metrics) = self.trainer.fit(model, &train, device)?;
            let (evaluation, scores) = self.trainer.evaluate_trained(&model, &test, device)?;

            debug!(
                fold = fold.number(),
                initial_loss = metrics.initial_loss(),
                final_loss = metrics.final_loss(),
                best_epoch = ?metrics.best_epoch,
                "fold trained"
            );
            info!(
                fold = fold.number(),
                accuracy = evaluation.accuracy_percent(),
                loss = evaluation.loss,
                train_accuracy = metrics.final_accuracy() * 100.0,
                "fold evaluated"
            );

            let results_path =
                writer.write_fold(fold.number(), test.targets(), &scores, test.n_classes())?;

            reports.push(FoldReport {
                fold: fold.number(),
                train_samples: train.len(),
                test_samples: test.len(),
                accuracy: evaluation.accuracy_percent(),
                loss: evaluation.loss,
                train_loss: metrics.final_loss(),
                train_accuracy: metrics.final_accuracy() * 100.0,
                results_path,
            });
        }

        let report = CrossValidationReport::new(label, summary, reports);
        info!(
            mean = report.mean_accuracy,
            std = report.std_accuracy,
            "cross-validation accuracy (%)"
        );
        writer.write_summary(&report)?;
        Ok(report)
    }
}
