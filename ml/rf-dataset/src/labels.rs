//! Label selection and one-hot encoding.

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Largest class id accepted from data or by [`encode`].
pub const MAX_LABEL: usize = u16::MAX as usize;

/// Which of the three DroneRF label rows to classify.
///
/// # Example
///
/// ```
/// use rf_dataset::LabelKind;
///
/// let kind = LabelKind::try_from(3).unwrap_or_default();
/// assert_eq!(kind, LabelKind::Mode);
/// assert_eq!(kind.number(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum LabelKind {
    /// Label 1: drone present or background only.
    Presence,

    /// Label 2: which drone model is transmitting.
    Model,

    /// Label 3: drone model and flight mode.
    #[default]
    Mode,
}

impl LabelKind {
    /// All label rows in file order.
    pub const ALL: [Self; 3] = [Self::Presence, Self::Model, Self::Mode];

    /// Returns the 1-based label number used in file names.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Presence => 1,
            Self::Model => 2,
            Self::Mode => 3,
        }
    }

    /// Returns the offset of this label row from the first label row.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.number() as usize - 1
    }

    /// Returns the label name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Model => "model",
            Self::Mode => "mode",
        }
    }
}

impl TryFrom<u8> for LabelKind {
    type Error = DatasetError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Presence),
            2 => Ok(Self::Model),
            3 => Ok(Self::Mode),
            other => Err(DatasetError::UnknownLabel(other)),
        }
    }
}

impl From<LabelKind> for u8 {
    fn from(kind: LabelKind) -> Self {
        kind.number()
    }
}

impl std::fmt::Display for LabelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// Row-major one-hot matrix, one row per sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneHot {
    data: Vec<f32>,
    rows: usize,
    classes: usize,
}

impl OneHot {
    /// Returns the number of rows (samples).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of classes (columns).
    #[must_use]
    pub const fn classes(&self) -> usize {
        self.classes
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the flat row-major values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns one row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.rows()`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.classes..(index + 1) * self.classes]
    }

    /// Iterates over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.classes.max(1))
    }

    /// Copies the selected rows into a flat buffer, in the given order.
    #[must_use]
    pub fn gather(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * self.classes);
        for &i in indices {
            out.extend_from_slice(self.row(i));
        }
        out
    }

    /// Decodes every row back to its class id.
    #[must_use]
    pub fn decode(&self) -> Vec<usize> {
        decode(self.iter_rows())
    }
}

/// Converts integer labels to one-hot rows with `max + 1` classes.
///
/// # Example
///
/// ```
/// use rf_dataset::encode;
///
/// let one_hot = encode(&[0, 2, 1]).unwrap_or_default();
/// assert_eq!(one_hot.classes(), 3);
/// assert_eq!(one_hot.row(1), &[0.0, 0.0, 1.0]);
/// ```
///
/// # Errors
///
/// Returns [`DatasetError::LabelOutOfRange`] if a label exceeds
/// [`MAX_LABEL`].
pub fn encode(labels: &[usize]) -> Result<OneHot> {
    let classes = match labels.iter().max() {
        Some(&max) if max > MAX_LABEL => {
            return Err(DatasetError::label_out_of_range(max, MAX_LABEL + 1));
        }
        Some(&max) => max + 1,
        None => 0,
    };
    one_hot(labels, classes)
}

/// Converts integer labels to one-hot rows with a fixed class count.
///
/// # Errors
///
/// Returns [`DatasetError::LabelOutOfRange`] if any label is `>= classes`
/// or the matrix would not fit in memory.
pub fn encode_with_classes(labels: &[usize], classes: usize) -> Result<OneHot> {
    if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
        return Err(DatasetError::label_out_of_range(label, classes));
    }
    one_hot(labels, classes)
}

fn one_hot(labels: &[usize], classes: usize) -> Result<OneHot> {
    let len = labels
        .len()
        .checked_mul(classes)
        .ok_or_else(|| DatasetError::label_out_of_range(classes.saturating_sub(1), classes))?;
    let mut data = vec![0.0; len];
    for (row, &label) in labels.iter().enumerate() {
        data[row * classes + label] = 1.0;
    }
    Ok(OneHot {
        data,
        rows: labels.len(),
        classes,
    })
}

/// Converts one-hot or probability rows to class ids by row-wise argmax.
///
/// Ties resolve to the first maximum. An empty row decodes to 0.
///
/// # Example
///
/// ```
/// use rf_dataset::decode;
///
/// let rows: [&[f32]; 2] = [&[0.1, 0.7, 0.2], &[0.5, 0.5, 0.0]];
/// assert_eq!(decode(rows), vec![1, 0]);
/// ```
#[must_use]
pub fn decode<'a, I>(rows: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    rows.into_iter().map(argmax).collect()
}

/// Index of the first maximum value in `row`.
#[must_use]
pub fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = i;
        }
    }
    best
}

/// Casts a raw label row to class ids, truncating toward zero.
///
/// # Errors
///
/// Returns [`DatasetError::InvalidLabel`] for negative or non-finite
/// values and for values above [`MAX_LABEL`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn labels_from_raw(raw: &[f64]) -> Result<Vec<usize>> {
    raw.iter()
        .enumerate()
        .map(|(sample, &value)| {
            let truncated = value.trunc();
            if value.is_finite() && (0.0..=MAX_LABEL as f64).contains(&truncated) {
                Ok(truncated as usize)
            } else {
                Err(DatasetError::invalid_label(sample, value))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_kind_numbers() {
        assert_eq!(LabelKind::Presence.number(), 1);
        assert_eq!(LabelKind::Model.number(), 2);
        assert_eq!(LabelKind::Mode.number(), 3);
        assert_eq!(LabelKind::Mode.offset(), 2);
    }

    #[test]
    fn label_kind_try_from() {
        assert_eq!(LabelKind::try_from(1).ok(), Some(LabelKind::Presence));
        assert!(matches!(
            LabelKind::try_from(0),
            Err(DatasetError::UnknownLabel(0))
        ));
        assert!(LabelKind::try_from(4).is_err());
    }

    #[test]
    fn label_kind_serializes_as_number() {
        let json = serde_json::to_string(&LabelKind::Model).unwrap_or_default();
        assert_eq!(json, "2");

        let parsed: std::result::Result<LabelKind, _> = serde_json::from_str("3");
        assert_eq!(parsed.ok(), Some(LabelKind::Mode));

        let bad: std::result::Result<LabelKind, _> = serde_json::from_str("9");
        assert!(bad.is_err());
    }

    #[test]
    fn encode_width_is_max_plus_one() {
        let one_hot = encode(&[3, 0, 1]).unwrap_or_default();
        assert_eq!(one_hot.rows(), 3);
        assert_eq!(one_hot.classes(), 4);
        assert_eq!(one_hot.row(0), &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(one_hot.row(1), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn encode_empty() {
        let one_hot = encode(&[]).unwrap_or_default();
        assert!(one_hot.is_empty());
        assert_eq!(one_hot.classes(), 0);
        assert_eq!(one_hot.iter_rows().count(), 0);
        assert!(one_hot.decode().is_empty());
    }

    #[test]
    fn encode_with_classes_pads() {
        let one_hot = encode_with_classes(&[0, 1], 4);
        assert!(one_hot.is_ok());
        assert_eq!(one_hot.map(|h| h.classes()).unwrap_or(0), 4);
    }

    #[test]
    fn encode_with_classes_rejects_out_of_range() {
        let err = encode_with_classes(&[0, 5], 3);
        assert!(matches!(
            err,
            Err(DatasetError::LabelOutOfRange {
                label: 5,
                classes: 3
            })
        ));
    }

    #[test]
    fn decode_inverts_encode() {
        let labels = vec![2, 0, 1, 1, 9, 4];
        assert_eq!(encode(&labels).map(|h| h.decode()).ok(), Some(labels));
    }

    #[test]
    fn decode_picks_first_maximum() {
        let rows: [&[f32]; 3] = [&[0.2, 0.9, 0.9], &[0.0, 0.0], &[]];
        assert_eq!(decode(rows), vec![1, 0, 0]);
    }

    #[test]
    fn decode_probabilities() {
        let rows: Vec<&[f32]> = vec![&[0.1, 0.2, 0.7], &[0.8, 0.1, 0.1]];
        assert_eq!(decode(rows), vec![2, 0]);
    }

    #[test]
    fn gather_preserves_order() {
        let one_hot = encode(&[0, 1, 2]).unwrap_or_default();
        let gathered = one_hot.gather(&[2, 0]);
        assert_eq!(gathered, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn labels_from_raw_truncates() {
        let labels = labels_from_raw(&[0.0, 1.0, 2.9, 10.0]);
        assert_eq!(labels.ok(), Some(vec![0, 1, 2, 10]));
    }

    #[test]
    fn labels_from_raw_rejects_negative_and_nan() {
        assert!(matches!(
            labels_from_raw(&[1.0, -1.0]),
            Err(DatasetError::InvalidLabel { sample: 1, .. })
        ));
        assert!(labels_from_raw(&[f64::NAN]).is_err());
        assert!(labels_from_raw(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn labels_from_raw_allows_small_negative_fraction() {
        // -0.5 truncates to -0.0, which is a valid class 0
        assert_eq!(labels_from_raw(&[-0.5]).ok(), Some(vec![0]));
    }

    #[test]
    fn labels_from_raw_rejects_huge_values() {
        assert!(matches!(
            labels_from_raw(&[0.0, 1e19]),
            Err(DatasetError::InvalidLabel { sample: 1, .. })
        ));
        #[allow(clippy::cast_precision_loss)]
        let at_limit = labels_from_raw(&[MAX_LABEL as f64]);
        assert_eq!(at_limit.ok(), Some(vec![MAX_LABEL]));
    }

    #[test]
    fn encode_rejects_labels_beyond_limit() {
        assert!(matches!(
            encode(&[0, usize::MAX]),
            Err(DatasetError::LabelOutOfRange { .. })
        ));
        assert!(encode(&[MAX_LABEL + 1]).is_err());
        assert!(matches!(
            encode_with_classes(&[0, 1], usize::MAX),
            Err(DatasetError::LabelOutOfRange { .. })
        ));
    }
}
