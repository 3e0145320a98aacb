//! Dataset summary and statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary statistics for a labeled dataset.
///
/// # Example
///
/// ```
/// use rf_dataset::DatasetSummary;
///
/// let summary = DatasetSummary::from_labels(&[0, 1, 1, 2], 2047);
/// assert_eq!(summary.total_samples, 4);
/// assert_eq!(summary.num_classes, 3);
/// assert_eq!(summary.class_distribution, vec![(0, 1), (1, 2), (2, 1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Total number of samples.
    pub total_samples: usize,

    /// Features per sample.
    pub num_features: usize,

    /// Number of distinct classes present.
    pub num_classes: usize,

    /// Class distribution (`class_id` -> count), sorted by id.
    pub class_distribution: Vec<(usize, usize)>,
}

impl DatasetSummary {
    /// Creates a summary from class ids.
    #[must_use]
    pub fn from_labels(labels: &[usize], num_features: usize) -> Self {
        let mut counts = BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }

        Self {
            total_samples: labels.len(),
            num_features,
            num_classes: counts.len(),
            class_distribution: counts.into_iter().collect(),
        }
    }

    /// Returns true if the dataset has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_samples == 0
    }

    /// Size of the smallest class, or 0 if empty.
    #[must_use]
    pub fn smallest_class(&self) -> usize {
        self.class_distribution
            .iter()
            .map(|&(_, count)| count)
            .min()
            .unwrap_or(0)
    }

    /// Size of the largest class, or 0 if empty.
    #[must_use]
    pub fn largest_class(&self) -> usize {
        self.class_distribution
            .iter()
            .map(|&(_, count)| count)
            .max()
            .unwrap_or(0)
    }

    /// Ratio of the smallest to the largest class (1.0 = balanced).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn balance_ratio(&self) -> f32 {
        let largest = self.largest_class();
        if largest == 0 {
            0.0
        } else {
            self.smallest_class() as f32 / largest as f32
        }
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} samples x {} features, {} classes",
            self.total_samples, self.num_features, self.num_classes
        )
    }
}
