//! Experiment configuration: JSON file plus command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rf_dataset::{DatasetLayout, LabelKind, StratifiedKFold};
use rf_models::{Activation, DenseClassifierConfig};
use rf_training::TrainingConfig;
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Hidden stack and activations. Input and output widths come from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureConfig {
    /// Units per hidden layer.
    pub hidden_dim: usize,

    /// Number of hidden layers.
    pub hidden_layers: usize,

    /// Activation after each hidden layer.
    pub hidden_activation: Activation,

    /// Activation on the output layer.
    pub output_activation: Activation,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        let base = DenseClassifierConfig::default();
        Self {
            hidden_dim: base.hidden_dim,
            hidden_layers: base.hidden_layers,
            hidden_activation: base.hidden_activation,
            output_activation: base.output_activation,
        }
    }
}

impl ArchitectureConfig {
    /// Model config with placeholder dims, filled in per dataset.
    pub fn to_model_config(self) -> DenseClassifierConfig {
        DenseClassifierConfig::default()
            .with_hidden_dim(self.hidden_dim)
            .with_hidden_layers(self.hidden_layers)
            .with_activations(self.hidden_activation, self.output_activation)
    }
}

/// Everything one cross-validation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Comma-separated DroneRF matrix.
    pub data_path: PathBuf,

    /// Directory receiving `Results_*.csv` and `cv_summary.json`.
    pub output_dir: PathBuf,

    /// Label row to classify.
    pub label: LabelKind,

    /// Rows holding features and labels.
    pub layout: DatasetLayout,

    /// Number of stratified folds.
    pub folds: usize,

    /// Shuffle samples within each class before dealing folds.
    pub shuffle: bool,

    /// Fold assignment seed; `None` draws from entropy.
    pub seed: Option<u64>,

    /// Hidden stack of the classifier.
    pub model: ArchitectureConfig,

    /// Optimizer, loss, epochs and batching.
    pub training: TrainingConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("RF_Data.csv"),
            output_dir: PathBuf::from("."),
            label: LabelKind::default(),
            layout: DatasetLayout::DRONE_RF,
            folds: 10,
            shuffle: true,
            seed: Some(1),
            model: ArchitectureConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Reads a JSON config. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Loads the file named by `--config` (or defaults), then applies flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, cli: &Cli) -> Result<()> {
        if let Some(path) = &cli.data {
            self.data_path.clone_from(path);
        }
        if let Some(dir) = &cli.output {
            self.output_dir.clone_from(dir);
        }
        if let Some(label) = cli.label {
            self.label = LabelKind::try_from(label)
                .with_context(|| format!("--label {label} is not 1, 2 or 3"))?;
        }
        if let Some(folds) = cli.folds {
            self.folds = folds;
        }
        if let Some(epochs) = cli.epochs {
            self.training.epochs = epochs;
        }
        if let Some(batch_size) = cli.batch_size {
            self.training.batch_size = batch_size;
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
            self.training.seed = Some(seed);
        }
        Ok(())
    }

    /// Rejects settings that cannot produce a run.
    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            bail!("folds must be at least 2, got {}", self.folds);
        }
        self.layout.validate().context("invalid dataset layout")?;
        self.model
            .to_model_config()
            .validate()
            .context("invalid model architecture")?;
        self.training.validate().context("invalid training config")?;
        Ok(())
    }

    /// Fold splitter described by this config.
    pub fn splitter(&self) -> StratifiedKFold {
        let mut splitter = StratifiedKFold::new(self.folds);
        if let Some(seed) = self.seed {
            splitter = splitter.with_seed(seed);
        }
        if !self.shuffle {
            splitter = splitter.without_shuffle();
        }
        splitter
    }
}
