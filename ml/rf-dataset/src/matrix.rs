//! RF feature matrix loading.
//!
//! The DroneRF CSV stores one sample per column. Leading rows hold the
//! spectrum features, the last three rows hold the labels. Loading
//! transposes the feature rows so each sample becomes a contiguous row.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DatasetError, Result};
use crate::labels::{LabelKind, labels_from_raw};

/// Row layout of the source matrix.
///
/// # Example
///
/// ```
/// use rf_dataset::DatasetLayout;
///
/// let layout = DatasetLayout::default();
/// assert_eq!(layout.feature_rows, 2047);
/// assert_eq!(layout.required_rows(), 2051);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    /// Number of leading feature rows.
    pub feature_rows: usize,

    /// Row index of the first label row.
    pub label_start: usize,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::DRONE_RF
    }
}

impl DatasetLayout {
    /// DroneRF layout: 2047 feature rows, one spare row, three label rows.
    pub const DRONE_RF: Self = Self {
        feature_rows: 2047,
        label_start: 2048,
    };

    /// Creates a layout.
    #[must_use]
    pub const fn new(feature_rows: usize, label_start: usize) -> Self {
        Self {
            feature_rows,
            label_start,
        }
    }

    /// Returns the row index holding the given label.
    #[must_use]
    pub const fn label_row(&self, kind: LabelKind) -> usize {
        self.label_start + kind.offset()
    }

    /// Returns the minimum number of rows the file must contain.
    #[must_use]
    pub const fn required_rows(&self) -> usize {
        self.label_start + LabelKind::ALL.len()
    }

    /// Checks that the layout is usable.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidLayout`] if there are no feature rows
    /// or the label rows overlap the features.
    pub fn validate(&self) -> Result<()> {
        if self.feature_rows == 0 {
            return Err(DatasetError::invalid_layout("feature_rows must be > 0"));
        }
        if self.label_start < self.feature_rows {
            return Err(DatasetError::invalid_layout(format!(
                "label rows start at {} inside the {} feature rows",
                self.label_start, self.feature_rows
            )));
        }
        Ok(())
    }
}

/// RF dataset with samples as rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RfDataset {
    features: Vec<f32>,
    n_samples: usize,
    n_features: usize,
    label_rows: [Vec<f64>; 3],
}

impl RfDataset {
    /// Loads a comma-separated matrix from disk.
    ///
    /// # Errors
    ///
    /// Fails on IO errors, unparsable fields, ragged rows, or a file too
    /// short for `layout`.
    pub fn load(path: impl AsRef<Path>, layout: DatasetLayout) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading RF data");
        let file = std::fs::File::open(path)
            .map_err(|err| DatasetError::io(format!("{}: {err}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(file), layout)
    }

    /// Reads a comma-separated matrix from any reader.
    ///
    /// # Errors
    ///
    /// See [`RfDataset::load`].
    pub fn from_reader<R: Read>(reader: R, layout: DatasetLayout) -> Result<Self> {
        layout.validate()?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut builder = MatrixBuilder::new(layout);
        let mut record = csv::StringRecord::new();
        let mut row = 0;
        while reader.read_record(&mut record)? {
            builder.push_row(row, record.iter())?;
            row += 1;
        }
        builder.finish(row)
    }

    /// Builds a dataset from in-memory rows (features then labels).
    ///
    /// # Errors
    ///
    /// Same checks as [`RfDataset::from_reader`], minus parsing.
    pub fn from_rows(rows: &[Vec<f64>], layout: DatasetLayout) -> Result<Self> {
        layout.validate()?;
        let mut builder = MatrixBuilder::new(layout);
        for (i, row) in rows.iter().enumerate() {
            builder.push_values(i, row)?;
        }
        builder.finish(rows.len())
    }

    /// Number of samples (source columns).
    #[must_use]
    pub const fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of features per sample.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Flat row-major feature matrix `[n_samples, n_features]`.
    #[must_use]
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Feature vector of one sample.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_samples()`.
    #[must_use]
    pub fn sample(&self, index: usize) -> &[f32] {
        &self.features[index * self.n_features..(index + 1) * self.n_features]
    }

    /// Copies the selected samples into a flat buffer, in the given order.
    #[must_use]
    pub fn gather(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * self.n_features);
        for &i in indices {
            out.extend_from_slice(self.sample(i));
        }
        out
    }

    /// Raw values of a label row.
    #[must_use]
    pub fn raw_labels(&self, kind: LabelKind) -> &[f64] {
        &self.label_rows[kind.offset()]
    }

    /// Class ids for the selected label row.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidLabel`] for negative or non-finite
    /// label values.
    pub fn labels(&self, kind: LabelKind) -> Result<Vec<usize>> {
        labels_from_raw(self.raw_labels(kind))
    }
}

/// Accumulates rows while transposing the feature block.
struct MatrixBuilder {
    layout: DatasetLayout,
    width: Option<usize>,
    // Feature rows as read, transposed in `finish`.
    feature_rows: Vec<Vec<f32>>,
    label_rows: [Vec<f64>; 3],
}

impl MatrixBuilder {
    fn new(layout: DatasetLayout) -> Self {
        Self {
            layout,
            width: None,
            feature_rows: Vec::with_capacity(layout.feature_rows),
            label_rows: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    fn push_row<'a>(&mut self, row: usize, fields: impl Iterator<Item = &'a str>) -> Result<()> {
        let values = fields
            .enumerate()
            .map(|(column, field)| {
                field
                    .parse::<f64>()
                    .map_err(|_| DatasetError::parse(row, column, field))
            })
            .collect::<Result<Vec<f64>>>()?;
        self.push_values(row, &values)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_values(&mut self, row: usize, values: &[f64]) -> Result<()> {
        let expected = *self.width.get_or_insert(values.len());
        if values.len() != expected {
            return Err(DatasetError::ragged_row(row, expected, values.len()));
        }

        if row < self.layout.feature_rows {
            self.feature_rows
                .push(values.iter().map(|&v| v as f32).collect());
        } else if let Some(slot) = row
            .checked_sub(self.layout.label_start)
            .and_then(|offset| self.label_rows.get_mut(offset))
        {
            *slot = values.to_vec();
        }
        Ok(())
    }

    fn finish(self, rows_read: usize) -> Result<RfDataset> {
        let required = self.layout.required_rows();
        if rows_read < required {
            return Err(DatasetError::too_few_rows(required, rows_read));
        }

        let n_samples = self.width.unwrap_or(0);
        if n_samples == 0 {
            return Err(DatasetError::EmptyDataset);
        }
        let n_features = self.feature_rows.len();

        let mut features = vec![0.0; n_samples * n_features];
        for (f, row) in self.feature_rows.iter().enumerate() {
            for (s, &value) in row.iter().enumerate() {
                features[s * n_features + f] = value;
            }
        }

        debug!(n_samples, n_features, "transposed feature matrix");

        Ok(RfDataset {
            features,
            n_samples,
            n_features,
            label_rows: self.label_rows,
        })
    }
}
