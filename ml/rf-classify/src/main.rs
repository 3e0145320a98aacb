//! RF drone classification with stratified k-fold cross-validation.
//!
//! Loads a DroneRF matrix, trains one dense classifier per fold on the
//! selected label row and writes `Results_{label}{fold}.csv` for each
//! fold plus `cv_summary.json`.
//!
//! # Usage
//!
//! - `rf-classify` - Reference run: `RF_Data.csv`, label 3, 10 folds, 200 epochs
//! - `rf-classify --label 1 --epochs 50` - Presence detection, shorter training
//! - `rf-classify --config experiment.json -v` - Settings from JSON, debug logging

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rf_dataset::RfDataset;
use rf_models::TrainBackend;
use rf_training::{CrossValidation, Trainer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ExperimentConfig;

/// Cross-validate a dense classifier on DroneRF spectra
#[derive(Debug, Parser)]
#[command(name = "rf-classify")]
#[command(about = "K-fold cross-validation of RF drone classifiers", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON experiment config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated data matrix [default: RF_Data.csv]
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory for result files [default: .]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Label row: 1 = presence, 2 = model, 3 = flight mode [default: 3]
    #[arg(long)]
    label: Option<u8>,

    /// Number of folds [default: 10]
    #[arg(long)]
    folds: Option<usize>,

    /// Training epochs per fold [default: 200]
    #[arg(long)]
    epochs: Option<usize>,

    /// Mini-batch size [default: 10]
    #[arg(long)]
    batch_size: Option<usize>,

    /// Seed for fold assignment and batch shuffling [default: 1]
    #[arg(long)]
    seed: Option<u64>,

    /// Log per-epoch progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExperimentConfig::resolve(&cli)?;
    info!(
        data = %config.data_path.display(),
        label = %config.label,
        folds = config.folds,
        epochs = config.training.epochs,
        "starting experiment"
    );

    let dataset = RfDataset::load(&config.data_path, config.layout)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    info!(
        samples = dataset.n_samples(),
        features = dataset.n_features(),
        "dataset loaded"
    );

    let experiment = CrossValidation::new(
        config.splitter(),
        config.model.to_model_config(),
        Trainer::new(config.training.clone()),
        &config.output_dir,
    );

    let device = Default::default();
    let report = experiment
        .run::<TrainBackend>(&dataset, config.label, &device)
        .context("cross-validation failed")?;

    for fold in &report.folds {
        println!("Fold {:>2}: {:.2}%", fold.fold, fold.accuracy);
    }
    println!(
        "{:.2}% (+/- {:.2}%)",
        report.mean_accuracy, report.std_accuracy
    );

    Ok(())
}
