use crate::errors::Result;
use crate::loss::loss_fn::{batch_mean, elementwise, LossFunction};
use crate::math::matrix::Matrix;

/// Categorical cross-entropy, meant for a Softmax output layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl LossFunction for CrossEntropyLoss {
    /// L = −Σ expected·ln(predicted) / batch
    ///
    /// `output`:   probabilities in (0, 1), one row per example
    /// `expected`: one-hot (or soft) target distribution, same shape
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64> {
        batch_mean(output, expected, "cross_entropy", |p, y| -y * p.ln())
    }

    /// Per-output gradient: predicted − expected
    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix> {
        elementwise(output, expected, "cross_entropy", |p, y| p - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn only_the_target_class_contributes() {
        let output = Matrix::from_row(vec![0.7, 0.2, 0.1]);
        let expected = Matrix::from_row(vec![0.0, 1.0, 0.0]);
        assert_relative_eq!(
            CrossEntropyLoss.calc_loss(&output, &expected).unwrap(),
            -(0.2_f64.ln()),
            epsilon = 1e-12
        );
        let grad = CrossEntropyLoss.deriv_loss(&output, &expected).unwrap();
        assert_relative_eq!(grad.data[0][1], -0.8, epsilon = 1e-12);
        assert_relative_eq!(grad.data[0][0], 0.7, epsilon = 1e-12);
    }
}
