use crate::errors::Result;
use crate::loss::loss_fn::{batch_mean, elementwise, LossFunction};
use crate::math::matrix::Matrix;

/// Binary cross-entropy. Outputs must lie strictly inside (0, 1); there is
/// no clamping, so a saturated output yields a non-finite loss.
#[derive(Debug, Clone, Copy, Default)]
pub struct BceLoss;

impl LossFunction for BceLoss {
    /// −Σ (y·ln(p) + (1−y)·ln(1−p)) / batch
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64> {
        batch_mean(output, expected, "binary_cross_entropy", |p, y| {
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
    }

    /// Per-output gradient: (p − y) / (p·(1 − p))
    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix> {
        elementwise(output, expected, "binary_cross_entropy", |p, y| (p - y) / (p * (1.0 - p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn loss_matches_closed_form() {
        let output = Matrix::from_data(vec![vec![0.8], vec![0.25]]).unwrap();
        let expected = Matrix::from_data(vec![vec![1.0], vec![0.0]]).unwrap();
        let want = (-(0.8_f64.ln()) - 0.75_f64.ln()) / 2.0;
        assert_relative_eq!(BceLoss.calc_loss(&output, &expected).unwrap(), want, epsilon = 1e-12);
    }

    #[test]
    fn gradient_matches_closed_form() {
        let grad = BceLoss
            .deriv_loss(&Matrix::from_row(vec![0.5]), &Matrix::from_row(vec![1.0]))
            .unwrap();
        assert_relative_eq!(grad.data[0][0], -2.0);
    }

    #[test]
    fn saturated_output_is_not_guarded() {
        let loss = BceLoss
            .calc_loss(&Matrix::from_row(vec![0.0]), &Matrix::from_row(vec![1.0]))
            .unwrap();
        assert!(!loss.is_finite());
    }
}
