use crate::errors::Result;
use crate::math::matrix::Matrix;
use crate::optim::optimizer::Optimizer;

/// Plain stochastic gradient descent, no momentum.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn optimize_weights(&mut self, gradient: &Matrix) -> Result<Matrix> {
        Ok(gradient.scale(self.learning_rate))
    }

    fn optimize_bias(&mut self, gradient: &[f64]) -> Result<Vec<f64>> {
        Ok(gradient.iter().map(|g| g * self.learning_rate).collect())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
