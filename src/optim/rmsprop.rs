use crate::errors::Result;
use crate::math::matrix::Matrix;
use crate::optim::optimizer::{bias_state_for, state_for, Optimizer};

/// RMSprop: scales each step by a running RMS of that parameter's gradients.
///
/// ```text
/// cache = decay·cache + (1 − decay)·g²
/// step  = lr·g / (√cache + ε)
/// ```
#[derive(Debug, Clone)]
pub struct RmsProp {
    pub learning_rate: f64,
    pub decay_rate: f64,
    pub epsilon: f64,
    cache: Option<Matrix>,
    cache_bias: Option<Vec<f64>>,
}

impl RmsProp {
    pub fn new(learning_rate: f64, decay_rate: f64, epsilon: f64) -> RmsProp {
        RmsProp {
            learning_rate,
            decay_rate,
            epsilon,
            cache: None,
            cache_bias: None,
        }
    }

    fn step(&self, cache: &mut f64, g: f64) -> f64 {
        *cache = self.decay_rate * *cache + (1.0 - self.decay_rate) * g * g;
        self.learning_rate * g / (cache.sqrt() + self.epsilon)
    }
}

impl Default for RmsProp {
    fn default() -> Self {
        RmsProp::new(0.001, 0.9, 1e-8)
    }
}

impl Optimizer for RmsProp {
    fn optimize_weights(&mut self, gradient: &Matrix) -> Result<Matrix> {
        let mut cache = self.cache.take();
        let res = state_for(&mut cache, gradient).map(|cache| {
            let mut res = Matrix::zeros(gradient.rows, gradient.cols);
            for i in 0..gradient.rows {
                for j in 0..gradient.cols {
                    res.data[i][j] = self.step(&mut cache.data[i][j], gradient.data[i][j]);
                }
            }
            res
        });
        self.cache = cache;
        res
    }

    fn optimize_bias(&mut self, gradient: &[f64]) -> Result<Vec<f64>> {
        let mut cache = self.cache_bias.take();
        let res = bias_state_for(&mut cache, gradient).map(|cache| {
            cache.iter_mut().zip(gradient)
                .map(|(c, &g)| self.step(c, g))
                .collect()
        });
        self.cache_bias = cache;
        res
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
