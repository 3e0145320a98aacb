//! Dense feed-forward classifier for RF spectra.

use burn::module::{Ignored, Module, Param};
use burn::nn;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Activation applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Rectified linear unit.
    #[default]
    Relu,
    /// Logistic sigmoid, outputs in `(0, 1)`.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Softmax over the last dimension.
    Softmax,
    /// Identity.
    Linear,
}

impl Activation {
    /// Applies the activation.
    pub fn apply<B: Backend, const D: usize>(self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Relu => activation::relu(x),
            Self::Sigmoid => activation::sigmoid(x),
            Self::Tanh => activation::tanh(x),
            Self::Softmax => activation::softmax(x, D - 1),
            Self::Linear => x,
        }
    }

    /// Returns the activation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
            Self::Linear => "linear",
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for the dense classifier.
///
/// Defaults: 3 hidden layers of 128 units with `ReLU`, sigmoid output.
///
/// # Example
///
/// ```
/// use rf_models::DenseClassifierConfig;
///
/// let config = DenseClassifierConfig::new(2047, 10);
/// assert_eq!(config.hidden_dim, 128);
/// assert_eq!(config.hidden_layers, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseClassifierConfig {
    /// Features per sample.
    pub input_dim: usize,

    /// Units per hidden layer.
    pub hidden_dim: usize,

    /// Number of hidden layers.
    pub hidden_layers: usize,

    /// Number of classes.
    pub output_dim: usize,

    /// Activation after each hidden layer.
    pub hidden_activation: Activation,

    /// Activation on the output layer.
    pub output_activation: Activation,
}

impl Default for DenseClassifierConfig {
    fn default() -> Self {
        Self::new(2047, 10)
    }
}

impl DenseClassifierConfig {
    /// Creates a configuration for the given input and class counts.
    #[must_use]
    pub const fn new(input_dim: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            hidden_dim: 128,
            hidden_layers: 3,
            output_dim,
            hidden_activation: Activation::Relu,
            output_activation: Activation::Sigmoid,
        }
    }

    /// Sets the hidden layer width.
    #[must_use]
    pub const fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    /// Sets the number of hidden layers.
    #[must_use]
    pub const fn with_hidden_layers(mut self, hidden_layers: usize) -> Self {
        self.hidden_layers = hidden_layers;
        self
    }

    /// Sets the input dimension.
    #[must_use]
    pub const fn with_input_dim(mut self, input_dim: usize) -> Self {
        self.input_dim = input_dim;
        self
    }

    /// Sets the output dimension.
    #[must_use]
    pub const fn with_output_dim(mut self, output_dim: usize) -> Self {
        self.output_dim = output_dim;
        self
    }

    /// Sets both activations.
    #[must_use]
    pub const fn with_activations(mut self, hidden: Activation, output: Activation) -> Self {
        self.hidden_activation = hidden;
        self.output_activation = output;
        self
    }

    /// Checks that every dimension is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("input_dim", self.input_dim),
            ("hidden_dim", self.hidden_dim),
            ("hidden_layers", self.hidden_layers),
            ("output_dim", self.output_dim),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ModelError::invalid_config(format!("{name} must be > 0"))),
            None => Ok(()),
        }
    }

    /// Builds a freshly initialized model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the config is invalid.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DenseClassifier<B>> {
        self.validate()?;
        Ok(DenseClassifier::new(*self, device))
    }
}

/// Multilayer perceptron classifier.
///
/// Architecture: Input -> (Linear -> hidden activation) x N -> Linear -> output activation
///
/// Weights use Xavier uniform initialization.
///
/// # Type Parameters
///
/// - `B`: The Burn backend (e.g., `NdArray`, `Autodiff<NdArray>`)
///
/// # Example
///
/// ```
/// use burn::tensor::Tensor;
/// use rf_models::{CpuBackend, DenseClassifierConfig};
///
/// let device = Default::default();
/// let model = DenseClassifierConfig::new(16, 4).init::<CpuBackend>(&device);
/// assert!(model.is_ok());
///
/// if let Ok(model) = model {
///     let output = model.forward(Tensor::zeros([3, 16], &device));
///     assert_eq!(output.dims(), [3, 4]);
/// }
/// ```
#[derive(Debug, Module)]
pub struct DenseClassifier<B: Backend> {
    hidden: Vec<nn::Linear<B>>,
    output: nn::Linear<B>,
    activations: Ignored<(Activation, Activation)>,
}

impl<B: Backend> DenseClassifier<B> {
    /// Creates a new classifier.
    ///
    /// Prefer [`DenseClassifierConfig::init`], which validates first.
    #[must_use]
    pub fn new(config: DenseClassifierConfig, device: &B::Device) -> Self {
        // Glorot-uniform kernels, zero biases.
        let dense = |d_in: usize, d_out: usize| -> nn::Linear<B> {
            let mut linear = nn::LinearConfig::new(d_in, d_out)
                .with_initializer(nn::Initializer::XavierUniform { gain: 1.0 })
                .init(device);
            linear.bias = Some(Param::from_tensor(Tensor::zeros([d_out], device)));
            linear
        };

        let hidden = (0..config.hidden_layers)
            .map(|layer| {
                let d_in = if layer == 0 {
                    config.input_dim
                } else {
                    config.hidden_dim
                };
                dense(d_in, config.hidden_dim)
            })
            .collect();
        let output = dense(config.hidden_dim, config.output_dim);

        Self {
            hidden,
            output,
            activations: Ignored((config.hidden_activation, config.output_activation)),
        }
    }

    /// Runs the forward pass.
    ///
    /// # Arguments
    ///
    /// - `input`: Input tensor of shape `[batch_size, input_dim]`
    ///
    /// # Returns
    ///
    /// Output tensor of shape `[batch_size, output_dim]` after the output activation.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let (hidden_activation, output_activation) = self.activations.0;
        let x = self
            .hidden
            .iter()
            .fold(input, |x, layer| hidden_activation.apply(layer.forward(x)));
        output_activation.apply(self.output.forward(x))
    }

    /// Number of hidden layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.hidden.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn device() -> <TestBackend as Backend>::Device {
        <TestBackend as Backend>::Device::default()
    }

    #[test]
    fn config_default() {
        let config = DenseClassifierConfig::default();
        assert_eq!(config.input_dim, 2047);
        assert_eq!(config.hidden_dim, 128);
        assert_eq!(config.hidden_layers, 3);
        assert_eq!(config.output_dim, 10);
        assert_eq!(config.hidden_activation, Activation::Relu);
        assert_eq!(config.output_activation, Activation::Sigmoid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = DenseClassifierConfig::new(8, 2)
            .with_hidden_dim(32)
            .with_hidden_layers(1)
            .with_activations(Activation::Tanh, Activation::Softmax);

        assert_eq!(config.hidden_dim, 32);
        assert_eq!(config.hidden_layers, 1);
        assert_eq!(config.hidden_activation, Activation::Tanh);
        assert_eq!(config.output_activation, Activation::Softmax);
    }

    #[test]
    fn config_invalid() {
        let err = DenseClassifierConfig::new(0, 3).validate();
        assert!(matches!(err, Err(ModelError::InvalidConfig(ref m)) if m.contains("input_dim")));

        let err = DenseClassifierConfig::new(4, 3)
            .with_hidden_layers(0)
            .validate();
        assert!(matches!(err, Err(ModelError::InvalidConfig(ref m)) if m.contains("hidden_layers")));

        assert!(
            DenseClassifierConfig::new(4, 0)
                .init::<TestBackend>(&device())
                .is_err()
        );
    }

    #[test]
    fn config_serialization() {
        let config = DenseClassifierConfig::new(2047, 4);
        let json = serde_json::to_string(&config).unwrap_or_default();
        assert!(json.contains("\"hidden_activation\":\"relu\""));

        let parsed: std::result::Result<DenseClassifierConfig, _> = serde_json::from_str(&json);
        assert_eq!(parsed.ok(), Some(config));
    }

    #[test]
    fn activation_display() {
        assert_eq!(Activation::Relu.to_string(), "relu");
        assert_eq!(Activation::Sigmoid.to_string(), "sigmoid");
    }

    #[test]
    fn activation_relu_clamps_negatives() {
        let x = Tensor::<TestBackend, 2>::from_floats([[-1.0, 2.0]], &device());
        let y = Activation::Relu.apply(x).into_data().to_vec::<f32>().unwrap_or_default();
        assert_eq!(y, vec![0.0, 2.0]);
    }

    #[test]
    fn activation_softmax_rows_sum_to_one() {
        let x = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0, 3.0]], &device());
        let y = Activation::Softmax.apply(x).into_data().to_vec::<f32>().unwrap_or_default();
        let sum: f32 = y.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn classifier_forward_shape() {
        let config = DenseClassifierConfig::new(16, 4);
        let model = DenseClassifier::<TestBackend>::new(config, &device());
        assert_eq!(model.depth(), 3);

        let input = Tensor::<TestBackend, 2>::zeros([5, 16], &device());
        let output = model.forward(input);
        assert_eq!(output.dims(), [5, 4]);
    }

    #[test]
    fn classifier_sigmoid_output_in_unit_interval() {
        let config = DenseClassifierConfig::new(8, 3).with_hidden_dim(16);
        let model = DenseClassifier::<TestBackend>::new(config, &device());

        let input = Tensor::<TestBackend, 2>::ones([4, 8], &device());
        let output = model.forward(input).into_data().to_vec::<f32>().unwrap_or_default();

        assert_eq!(output.len(), 12);
        assert!(output.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn classifier_single_hidden_layer() {
        let config = DenseClassifierConfig::new(4, 2).with_hidden_layers(1);
        let model = DenseClassifier::<TestBackend>::new(config, &device());
        assert_eq!(model.depth(), 1);

        let output = model.forward(Tensor::zeros([1, 4], &device()));
        assert_eq!(output.dims(), [1, 2]);
    }

    #[test]
    fn classifier_biases_start_at_zero() {
        let model = DenseClassifier::<TestBackend>::new(DenseClassifierConfig::new(16, 4), &device());
        assert_eq!(model.depth(), 3);

        for layer in model.hidden.iter().chain(std::iter::once(&model.output)) {
            let Some(bias) = layer.bias.as_ref() else {
                panic!("dense layers carry a bias");
            };
            let values = crate::backend::tensor_to_vec(bias.val()).unwrap_or_default();
            assert!(!values.is_empty());
            assert!(values.iter().all(|&b| b == 0.0), "{values:?}");

            let weights = crate::backend::tensor_to_vec(layer.weight.val()).unwrap_or_default();
            assert!(weights.iter().any(|&w| w != 0.0));
        }
    }
}
