use crate::errors::Result;
use crate::loss::loss_fn::{batch_mean, elementwise, LossFunction};
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl LossFunction for MseLoss {
    /// Σ (expected - output)² / batch
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64> {
        batch_mean(output, expected, "mse", |o, e| (e - o).powi(2))
    }

    /// Per-output gradient: 2·(output - expected)
    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix> {
        elementwise(output, expected, "mse", |o, e| 2.0 * (o - e))
    }
}
