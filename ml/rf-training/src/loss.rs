//! Loss functions for classifier training.
//!
//! All losses take network outputs after the output activation
//! (probabilities) and one-hot targets, both `[batch, classes]`.

use burn::prelude::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Clamp bound keeping logarithms finite.
const EPSILON: f32 = 1e-7;

/// Loss minimized during training.
///
/// # Example
///
/// ```
/// use rf_training::LossFunction;
///
/// assert_eq!(LossFunction::default(), LossFunction::MeanSquaredError);
/// assert_eq!(LossFunction::MeanSquaredError.name(), "mse");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossFunction {
    /// Mean squared error over every output.
    #[default]
    MeanSquaredError,

    /// Binary cross-entropy per output, averaged.
    BinaryCrossEntropy,

    /// Categorical cross-entropy per sample, averaged.
    CategoricalCrossEntropy,
}

impl LossFunction {
    /// Returns the short name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MeanSquaredError => "mse",
            Self::BinaryCrossEntropy => "binary_crossentropy",
            Self::CategoricalCrossEntropy => "categorical_crossentropy",
        }
    }

    /// Computes the scalar loss.
    pub fn compute<B: Backend>(self, pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
        match self {
            Self::MeanSquaredError => mse_loss(pred, target),
            Self::BinaryCrossEntropy => binary_cross_entropy(pred, target),
            Self::CategoricalCrossEntropy => categorical_cross_entropy(pred, target),
        }
    }
}

impl std::fmt::Display for LossFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mean squared error.
///
/// # Arguments
///
/// - `pred`: Predicted scores `[batch, classes]`
/// - `target`: One-hot targets `[batch, classes]`
///
/// # Returns
///
/// Scalar loss value.
pub fn mse_loss<B: Backend>(pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    (pred - target).powf_scalar(2.0).mean()
}

/// Binary cross-entropy on probabilities.
///
/// `-[t * log(p) + (1-t) * log(1-p)]`, averaged over every output.
pub fn binary_cross_entropy<B: Backend>(pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    let prob = pred.clamp(EPSILON, 1.0 - EPSILON);

    let log_prob = prob.clone().log();
    let log_one_minus_prob = (Tensor::ones_like(&prob) - prob).log();

    let bce = target.clone().neg() * log_prob
        - (Tensor::ones_like(&target) - target) * log_one_minus_prob;

    bce.mean()
}

/// Categorical cross-entropy on probabilities.
///
/// Rows are renormalized to sum to one first, so sigmoid outputs work too.
pub fn categorical_cross_entropy<B: Backend>(
    pred: Tensor<B, 2>,
    target: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let prob = pred.clamp(EPSILON, 1.0);
    let prob = prob.clone() / prob.sum_dim(1);
    let prob = prob.clamp(EPSILON, 1.0 - EPSILON);

    (target * prob.log()).sum_dim(1).neg().mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use burn::tensor::{ElementConversion, TensorData};
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn tensor(rows: &[[f32; 2]]) -> Tensor<TestBackend, 2> {
        let device = Default::default();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Tensor::from_data(TensorData::new(flat, [rows.len(), 2]), &device)
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem()
    }

    #[test]
    fn loss_function_names() {
        assert_eq!(LossFunction::MeanSquaredError.to_string(), "mse");
        assert_eq!(LossFunction::BinaryCrossEntropy.name(), "binary_crossentropy");
    }

    #[test]
    fn loss_function_serialization() {
        let json = serde_json::to_string(&LossFunction::CategoricalCrossEntropy);
        assert_eq!(json.ok().as_deref(), Some("\"categorical_cross_entropy\""));
    }

    #[test]
    fn mse_zero_for_perfect_prediction() {
        let t = tensor(&[[1.0, 0.0], [0.0, 1.0]]);
        assert_relative_eq!(scalar(mse_loss(t.clone(), t)), 0.0);
    }

    #[test]
    fn mse_known_value() {
        let pred = tensor(&[[0.5, 0.5], [1.0, 0.0]]);
        let target = tensor(&[[1.0, 0.0], [0.0, 1.0]]);
        // (0.25 + 0.25 + 1 + 1) / 4
        assert_relative_eq!(scalar(mse_loss(pred, target)), 0.625, epsilon = 1e-6);
    }

    #[test]
    fn bce_known_value() {
        let pred = tensor(&[[0.5, 0.5]]);
        let target = tensor(&[[1.0, 0.0]]);
        assert_relative_eq!(
            scalar(binary_cross_entropy(pred, target)),
            std::f32::consts::LN_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn bce_is_finite_at_extremes() {
        let pred = tensor(&[[0.0, 1.0]]);
        let target = tensor(&[[1.0, 0.0]]);
        assert!(scalar(binary_cross_entropy(pred, target)).is_finite());
    }

    #[test]
    fn cce_known_value() {
        let pred = tensor(&[[0.25, 0.75]]);
        let target = tensor(&[[0.0, 1.0]]);
        assert_relative_eq!(
            scalar(categorical_cross_entropy(pred, target)),
            -(0.75f32).ln(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn cce_renormalizes_sigmoid_rows() {
        let pred = tensor(&[[0.5, 0.5]]);
        let target = tensor(&[[1.0, 0.0]]);
        assert_relative_eq!(
            scalar(categorical_cross_entropy(pred, target)),
            std::f32::consts::LN_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn compute_dispatches() {
        let pred = tensor(&[[0.5, 0.5], [1.0, 0.0]]);
        let target = tensor(&[[1.0, 0.0], [0.0, 1.0]]);
        let loss = LossFunction::MeanSquaredError.compute(pred, target);
        assert_relative_eq!(scalar(loss), 0.625, epsilon = 1e-6);
    }
}
