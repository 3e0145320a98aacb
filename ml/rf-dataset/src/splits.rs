//! Stratified k-fold partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DatasetError, Result};

/// One train/test partition of the sample indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Fold index (0-based).
    pub index: usize,

    /// Training sample indices, ascending.
    pub train: Vec<usize>,

    /// Held-out sample indices, ascending.
    pub test: Vec<usize>,
}

impl Fold {
    /// Returns the 1-based fold number used in output file names.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.index + 1
    }
}

/// Stratified k-fold splitter.
///
/// Each fold's test set keeps the class proportions of the whole
/// dataset. Overall test set sizes differ by at most one.
///
/// # Example
///
/// ```
/// use rf_dataset::StratifiedKFold;
///
/// let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
/// let folds = StratifiedKFold::new(4).with_seed(1).split(&labels);
/// assert!(folds.is_ok());
///
/// let folds = folds.unwrap_or_default();
/// assert_eq!(folds.len(), 4);
/// assert!(folds.iter().all(|f| f.test.len() == 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedKFold {
    /// Number of folds.
    pub n_splits: usize,

    /// Whether to shuffle each class before assigning folds.
    pub shuffle: bool,

    /// Seed for the shuffle. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self {
            n_splits: 10,
            shuffle: true,
            seed: Some(1),
        }
    }
}

impl StratifiedKFold {
    /// Creates a shuffling splitter with `n_splits` folds and no fixed seed.
    #[must_use]
    pub const fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: None,
        }
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disables shuffling.
    #[must_use]
    pub const fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Partitions `labels` into `n_splits` stratified folds.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidSplit`] if `n_splits < 2`, if there
    /// are fewer samples than folds, or if every class has fewer members
    /// than folds.
    pub fn split(&self, labels: &[usize]) -> Result<Vec<Fold>> {
        let k = self.n_splits;
        let n = labels.len();
        if k < 2 {
            return Err(DatasetError::invalid_split(format!(
                "n_splits must be at least 2, got {k}"
            )));
        }
        if n < k {
            return Err(DatasetError::invalid_split(format!(
                "cannot make {k} folds from {n} samples"
            )));
        }

        // Compact class ids to 0..n_classes
        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();
        let n_classes = classes.len();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (sample, &class) in encoded.iter().enumerate() {
            members[class].push(sample);
        }

        let largest = members.iter().map(Vec::len).max().unwrap_or(0);
        if largest < k {
            return Err(DatasetError::invalid_split(format!(
                "n_splits={k} exceeds the number of members in every class"
            )));
        }
        let smallest = members.iter().map(Vec::len).min().unwrap_or(0);
        if smallest < k {
            warn!(
                smallest,
                n_splits = k,
                "least populated class has fewer members than folds"
            );
        }

        // Deal sorted labels round-robin so fold sizes stay balanced
        let mut sorted = encoded.clone();
        sorted.sort_unstable();
        let mut allocation = vec![vec![0usize; n_classes]; k];
        for (position, &class) in sorted.iter().enumerate() {
            allocation[position % k][class] += 1;
        }

        let mut rng = self
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

        let mut test_fold = vec![0usize; n];
        for (class, samples) in members.iter().enumerate() {
            let mut fold_ids: Vec<usize> = (0..k)
                .flat_map(|fold| std::iter::repeat_n(fold, allocation[fold][class]))
                .collect();
            if self.shuffle {
                fold_ids.shuffle(&mut rng);
            }
            for (&sample, &fold) in samples.iter().zip(&fold_ids) {
                test_fold[sample] = fold;
            }
        }

        Ok((0..k)
            .map(|index| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..n).partition(|&sample| test_fold[sample] == index);
                Fold { index, train, test }
            })
            .collect())
    }
}
