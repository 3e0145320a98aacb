//! RF dataset handling for drone classification.
//!
//! This crate turns the DroneRF matrix into something a classifier can
//! train on:
//!
//! # Loading
//!
//! - [`RfDataset`] - Feature matrix (samples as rows) plus the three label rows
//! - [`DatasetLayout`] - Which rows hold features and labels
//! - [`LabelKind`] - Presence, model, or flight mode label
//!
//! # Labels
//!
//! - [`encode`] / [`decode`] - One-hot conversion and row-wise argmax
//! - [`OneHot`] - Row-major one-hot matrix
//!
//! # Cross-Validation
//!
//! - [`StratifiedKFold`] - Class-preserving k-fold partitioning
//! - [`Fold`] - One train/test partition
//! - [`DatasetSummary`] - Class distribution statistics
//!
//! # Example
//!
//! ```
//! use rf_dataset::{DatasetLayout, LabelKind, RfDataset, StratifiedKFold, encode};
//!
//! let csv = "1,2,3,4\n0,0,0,0\n0,1,0,1\n0,1,0,1\n0,1,0,1\n";
//! let dataset = RfDataset::from_reader(csv.as_bytes(), DatasetLayout::new(1, 2));
//! assert!(dataset.is_ok());
//!
//! let dataset = dataset.unwrap_or_else(|_| unreachable!());
//! let labels = dataset.labels(LabelKind::Mode).unwrap_or_default();
//! let targets = encode(&labels).unwrap_or_default();
//! assert_eq!(targets.classes(), 2);
//!
//! let folds = StratifiedKFold::new(2).with_seed(1).split(&labels);
//! assert_eq!(folds.map(|f| f.len()).unwrap_or(0), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod labels;
mod matrix;
mod splits;
mod summary;

// Re-export loading types
pub use matrix::{DatasetLayout, RfDataset};

// Re-export label helpers
pub use labels::{
    LabelKind, MAX_LABEL, OneHot, argmax, decode, encode, encode_with_classes, labels_from_raw,
};

// Re-export split utilities
pub use splits::{Fold, StratifiedKFold};

// Re-export summary types
pub use summary::DatasetSummary;

// Re-export error types
pub use error::{DatasetError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        DatasetError, DatasetLayout, DatasetSummary, Fold, LabelKind, OneHot, RfDataset,
        StratifiedKFold, decode, encode,
    };
}
