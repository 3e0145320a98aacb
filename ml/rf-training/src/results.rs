//! Per-fold prediction export.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TrainingError};

/// Writes `Results_{label}{fold}.csv` files into an output directory.
///
/// Each row holds the true one-hot values followed by the predicted
/// scores, comma-separated, with no header.
///
/// # Example
///
/// ```
/// use rf_training::ResultsWriter;
///
/// let writer = ResultsWriter::new("out", 3);
/// assert_eq!(writer.fold_path(1), std::path::Path::new("out/Results_31.csv"));
/// assert_eq!(writer.fold_path(10), std::path::Path::new("out/Results_310.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsWriter {
    output_dir: PathBuf,
    label: u8,
}

impl ResultsWriter {
    /// File name prefix shared by every fold file.
    pub const PREFIX: &'static str = "Results_";

    /// Summary file name.
    pub const SUMMARY_FILE: &'static str = "cv_summary.json";

    /// Creates a writer for the given label number (1-3).
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, label: u8) -> Self {
        Self {
            output_dir: output_dir.into(),
            label,
        }
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the results file for a 1-based fold number.
    #[must_use]
    pub fn fold_path(&self, fold_number: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{}{fold_number}.csv", Self::PREFIX, self.label))
    }

    /// Path of the summary file.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(Self::SUMMARY_FILE)
    }

    /// Writes true and predicted values for one fold.
    ///
    /// `targets` and `scores` are flat `[rows, classes]` buffers.
    ///
    /// # Errors
    ///
    /// Fails if the buffers disagree in shape or the file cannot be written.
    pub fn write_fold(
        &self,
        fold_number: usize,
        targets: &[f32],
        scores: &[f32],
        classes: usize,
    ) -> Result<PathBuf> {
        if classes == 0 || targets.len() != scores.len() || targets.len() % classes != 0 {
            return Err(TrainingError::results(format!(
                "{} targets and {} scores do not form rows of {classes} classes",
                targets.len(),
                scores.len()
            )));
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.fold_path(fold_number);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        let mut record = Vec::with_capacity(2 * classes);
        for (truth, predicted) in targets.chunks_exact(classes).zip(scores.chunks_exact(classes)) {
            record.clear();
            record.extend(truth.iter().chain(predicted).map(|v| format!("{v:?}")));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = targets.len() / classes, "wrote fold results");
        Ok(path)
    }

    /// Writes any serializable summary as pretty JSON.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or serialization fails.
    pub fn write_summary<T: Serialize>(&self, summary: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.summary_path();
        let file = fs::File::create(&path)?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, summary)?;
        out.flush()?;
        Ok(path)
    }
}
