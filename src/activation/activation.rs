use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::errors::{NnError, Result};
use crate::math::{init::WeightInit, matrix::Matrix};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    Sigmoid,
    /// Row-wise normalized exponential. Not element-wise; handled in
    /// `activate()` and `backward()` over whole rows.
    Softmax,
    /// Stochastic column masking. In training mode each output column is
    /// kept with probability `1 - rate` (no rescaling); otherwise identity.
    Dropout { rate: f64 },
}

impl ActivationFunction {
    /// Weight-initialization scheme paired with this activation.
    pub fn weight_init(&self) -> WeightInit {
        match self {
            ActivationFunction::ReLU => WeightInit::He,
            ActivationFunction::Sigmoid => WeightInit::LeCun,
            ActivationFunction::Softmax | ActivationFunction::Dropout { .. } => WeightInit::Glorot,
        }
    }

    /// Element-wise activation. `Softmax` and `Dropout` have no scalar form
    /// and are passed through here; use `activate()` for those.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Softmax | ActivationFunction::Dropout { .. } => x,
        }
    }

    /// Applies the activation to a batch of pre-activation values.
    ///
    /// `mask` is the per-column keep mask for `Dropout` in training mode;
    /// `None` means every column is kept.
    pub fn activate(&self, pre_activation: &Matrix, mask: Option<&[bool]>) -> Matrix {
        match self {
            ActivationFunction::ReLU | ActivationFunction::Sigmoid => {
                pre_activation.map(|x| self.function(x))
            }
            ActivationFunction::Softmax => softmax(pre_activation),
            ActivationFunction::Dropout { .. } => match mask {
                Some(mask) => apply_mask(pre_activation, mask),
                None => pre_activation.clone(),
            },
        }
    }

    /// Maps ∂L/∂a (upstream `gradients`) to ∂L/∂z for this activation.
    ///
    /// Element-wise activations take the Hadamard product with their
    /// derivative. Softmax applies its full Jacobian row by row:
    /// `δ_j = s_j·(g_j − Σ_k g_k·s_k)`.
    pub fn backward(&self, gradients: &Matrix, pre_activation: &Matrix, mask: Option<&[bool]>) -> Result<Matrix> {
        match self {
            ActivationFunction::ReLU => {
                gradients.hadamard(&pre_activation.map(|x| if x > 0.0 { 1.0 } else { 0.0 }))
            }
            ActivationFunction::Sigmoid => {
                let s = pre_activation.map(|x| self.function(x));
                gradients.hadamard(&s.map(|s| s * (1.0 - s)))
            }
            ActivationFunction::Softmax => {
                if gradients.shape() != pre_activation.shape() {
                    return Err(NnError::shape("softmax backward", gradients.shape(), pre_activation.shape()));
                }
                let s = softmax(pre_activation);
                let data = s.data.iter().zip(&gradients.data)
                    .map(|(s_row, g_row)| {
                        let dot: f64 = s_row.iter().zip(g_row).map(|(s, g)| s * g).sum();
                        s_row.iter().zip(g_row).map(|(s, g)| s * (g - dot)).collect()
                    })
                    .collect();
                Ok(Matrix { rows: s.rows, cols: s.cols, data })
            }
            ActivationFunction::Dropout { .. } => {
                if gradients.shape() != pre_activation.shape() {
                    return Err(NnError::shape("dropout backward", gradients.shape(), pre_activation.shape()));
                }
                Ok(match mask {
                    Some(mask) => apply_mask(gradients, mask),
                    None => gradients.clone(),
                })
            }
        }
    }
}

/// Row-wise softmax. Each row is shifted by its max before exponentiating.
pub fn softmax(pre_activation: &Matrix) -> Matrix {
    let data = pre_activation.data.iter()
        .map(|row| {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = row.iter().map(|x| (x - max).exp()).collect();
            let sum: f64 = exps.iter().sum();
            exps.into_iter().map(|e| e / sum).collect()
        })
        .collect();
    Matrix { rows: pre_activation.rows, cols: pre_activation.cols, data }
}

/// Zeroes every column `j` with `mask[j] == false`, in every row.
fn apply_mask(values: &Matrix, mask: &[bool]) -> Matrix {
    Matrix {
        rows: values.rows,
        cols: values.cols,
        data: values.data.iter()
            .map(|row| row.iter().zip(mask).map(|(&x, &keep)| if keep { x } else { 0.0 }).collect())
            .collect(),
    }
}
