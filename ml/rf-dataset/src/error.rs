//! Error types for rf-dataset crate.

use thiserror::Error;

/// Errors that can occur while loading or partitioning RF data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A field could not be parsed as a number.
    #[error("row {row}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        /// Zero-based row in the source file.
        row: usize,
        /// Zero-based column in the source file.
        column: usize,
        /// Offending field.
        value: String,
    },

    /// A row has a different width than the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based row in the source file.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },

    /// The file does not contain every row the layout refers to.
    #[error("dataset has {found} rows, layout needs at least {expected}")]
    TooFewRows {
        /// Rows required by the layout.
        expected: usize,
        /// Rows present in the file.
        found: usize,
    },

    /// Empty dataset.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A label value cannot be used as a class id.
    #[error("sample {sample}: invalid label value {value}")]
    InvalidLabel {
        /// Sample (column) index.
        sample: usize,
        /// Raw label value.
        value: f64,
    },

    /// A label is outside the declared class range.
    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange {
        /// Offending label.
        label: usize,
        /// Declared class count.
        classes: usize,
    },

    /// Unknown label row selector.
    #[error("unknown label row {0} (expected 1, 2 or 3)")]
    UnknownLabel(u8),

    /// Invalid layout.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Folds cannot be built for these labels.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl DatasetError {
    /// Creates a parse error.
    #[must_use]
    pub fn parse(row: usize, column: usize, value: impl Into<String>) -> Self {
        Self::Parse {
            row,
            column,
            value: value.into(),
        }
    }

    /// Creates a ragged row error.
    #[must_use]
    pub const fn ragged_row(row: usize, expected: usize, found: usize) -> Self {
        Self::RaggedRow {
            row,
            expected,
            found,
        }
    }

    /// Creates a too-few-rows error.
    #[must_use]
    pub const fn too_few_rows(expected: usize, found: usize) -> Self {
        Self::TooFewRows { expected, found }
    }

    /// Creates an invalid label error.
    #[must_use]
    pub const fn invalid_label(sample: usize, value: f64) -> Self {
        Self::InvalidLabel { sample, value }
    }

    /// Creates a label out of range error.
    #[must_use]
    pub const fn label_out_of_range(label: usize, classes: usize) -> Self {
        Self::LabelOutOfRange { label, classes }
    }

    /// Creates an invalid layout error.
    #[must_use]
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout(reason.into())
    }

    /// Creates an invalid split error.
    #[must_use]
    pub fn invalid_split(reason: impl Into<String>) -> Self {
        Self::InvalidSplit(reason.into())
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io(reason.into())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_parse() {
        let err = DatasetError::parse(3, 7, "abc");
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("column 7"));
        assert!(msg.contains("\"abc\""));
    }

    #[test]
    fn error_ragged_row() {
        let err = DatasetError::ragged_row(2, 10, 9);
        assert!(err.to_string().contains("has 9 columns, expected 10"));
    }

    #[test]
    fn error_too_few_rows() {
        let err = DatasetError::too_few_rows(2051, 12);
        assert!(err.to_string().contains("at least 2051"));
    }

    #[test]
    fn error_invalid_label() {
        let err = DatasetError::invalid_label(4, -1.0);
        assert!(err.to_string().contains("sample 4"));
    }

    #[test]
    fn error_unknown_label() {
        let err = DatasetError::UnknownLabel(7);
        assert!(err.to_string().contains("unknown label row 7"));
    }

    #[test]
    fn error_invalid_split() {
        let err = DatasetError::invalid_split("n_splits must be at least 2");
        assert!(err.to_string().contains("invalid split"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
