use serde::{Serialize, Deserialize};

use crate::errors::Result;
use crate::loss::loss_fn::{batch_mean, elementwise, LossFunction};
use crate::math::matrix::Matrix;

pub const DEFAULT_DELTA: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HuberLoss {
    pub delta: f64,
}

impl HuberLoss {
    pub fn new(delta: f64) -> HuberLoss {
        HuberLoss { delta }
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        HuberLoss::new(DEFAULT_DELTA)
    }
}

impl LossFunction for HuberLoss {
    /// Σ h(expected − output) / batch
    /// where h(e) = 0.5·e²  if |e| < δ
    ///              δ·(|e| − 0.5·δ)  otherwise
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64> {
        let delta = self.delta;
        batch_mean(output, expected, "huber", |o, y| {
            let e = y - o;
            if e.abs() < delta {
                0.5 * e * e
            } else {
                delta * (e.abs() - 0.5 * delta)
            }
        })
    }

    /// Per-output gradient: e  if |e| < δ,  else δ·sign(e), with e = output − expected
    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let delta = self.delta;
        elementwise(output, expected, "huber", |o, y| {
            let e = o - y;
            if e.abs() < delta { e } else { delta * e.signum() }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_inside_delta_linear_outside() {
        let huber = HuberLoss::default();
        let expected = Matrix::from_row(vec![0.0, 0.0]);
        let output = Matrix::from_row(vec![0.5, 3.0]);
        // 0.5·0.25 + 1·(3 − 0.5)
        assert_relative_eq!(huber.calc_loss(&output, &expected).unwrap(), 0.125 + 2.5);
    }

    #[test]
    fn gradient_is_clipped_to_delta() {
        let huber = HuberLoss::new(2.0);
        let expected = Matrix::from_row(vec![0.0, 0.0, 0.0]);
        let output = Matrix::from_row(vec![1.5, 5.0, -7.0]);
        let grad = huber.deriv_loss(&output, &expected).unwrap();
        assert_eq!(grad.data, vec![vec![1.5, 2.0, -2.0]]);
    }

    #[test]
    fn boundary_falls_on_linear_branch() {
        let huber = HuberLoss::default();
        let grad = huber
            .deriv_loss(&Matrix::from_row(vec![-1.0]), &Matrix::from_row(vec![0.0]))
            .unwrap();
        assert_eq!(grad.data, vec![vec![-1.0]]);
        let loss = huber
            .calc_loss(&Matrix::from_row(vec![1.0]), &Matrix::from_row(vec![0.0]))
            .unwrap();
        assert_relative_eq!(loss, 0.5);
    }
}
