//! Backend aliases and host/tensor conversion.

use burn::prelude::Backend;
use burn::tensor::{Tensor, TensorData};

use crate::error::{ModelError, Result};

/// CPU backend used for inference and evaluation.
pub type CpuBackend = burn_ndarray::NdArray<f32>;

/// CPU backend with automatic differentiation, used for training.
pub type TrainBackend = burn_autodiff::Autodiff<CpuBackend>;

/// Builds a `[rows, cols]` tensor from row-major host values.
///
/// # Errors
///
/// Returns [`ModelError::ShapeMismatch`] if `values.len() != rows * cols`.
///
/// # Example
///
/// ```
/// use rf_models::{CpuBackend, matrix_to_tensor};
///
/// let device = Default::default();
/// let tensor = matrix_to_tensor::<CpuBackend>(vec![1.0, 2.0, 3.0, 4.0], 2, 2, &device);
/// assert_eq!(tensor.map(|t| t.dims()).ok(), Some([2, 2]));
/// ```
pub fn matrix_to_tensor<B: Backend>(
    values: Vec<f32>,
    rows: usize,
    cols: usize,
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    if values.len() != rows * cols {
        return Err(ModelError::shape_mismatch(
            format!("{} values for [{rows}, {cols}]", rows * cols),
            values.len().to_string(),
        ));
    }
    Ok(Tensor::from_data(TensorData::new(values, [rows, cols]), device))
}

/// Reads a tensor back into row-major `f32` host values.
///
/// # Errors
///
/// Returns [`ModelError::TensorData`] if the data cannot be converted.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| ModelError::tensor_data(format!("{err:?}")))
}
