use crate::errors::Result;
use crate::math::matrix::Matrix;
use crate::optim::optimizer::{bias_state_for, state_for, Optimizer};

/// Adam with bias-corrected first and second moments.
///
/// ```text
/// g  = g + wd·g                 (weights only)
/// m  = β1·m + (1 − β1)·g
/// v  = β2·v + (1 − β2)·g²
/// m̂  = m / (1 − β1^t),  v̂ = v / (1 − β2^t)
/// step = lr·m̂ / (√v̂ + ε)
/// ```
///
/// The step counter `t` is shared between weight and bias calls and bumps on
/// every call, so one backward pass advances it by two. Weight decay inflates
/// the raw gradient before the moments are updated (it is not decoupled as in
/// AdamW).
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub weight_decay: f64,
    t: u64,
    m: Option<Matrix>,
    v: Option<Matrix>,
    m_bias: Option<Vec<f64>>,
    v_bias: Option<Vec<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64, weight_decay: f64) -> Adam {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: None,
            v: None,
            m_bias: None,
            v_bias: None,
        }
    }

    /// Number of optimizer calls made so far (weights and bias both count).
    pub fn steps(&self) -> u64 {
        self.t
    }

    fn step(&self, m: &mut f64, v: &mut f64, g: f64) -> f64 {
        *m = self.beta1 * *m + (1.0 - self.beta1) * g;
        *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
        let t = self.t as f64;
        let m_hat = *m / (1.0 - self.beta1.powf(t));
        let v_hat = *v / (1.0 - self.beta2.powf(t));
        self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon)
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001, 0.9, 0.999, 1e-8, 0.01)
    }
}

impl Optimizer for Adam {
    fn optimize_weights(&mut self, gradient: &Matrix) -> Result<Matrix> {
        let (mut m, mut v) = (self.m.take(), self.v.take());
        let res = match (state_for(&mut m, gradient), state_for(&mut v, gradient)) {
            (Ok(m), Ok(v)) => {
                self.t += 1;
                let mut res = Matrix::zeros(gradient.rows, gradient.cols);
                for i in 0..gradient.rows {
                    for j in 0..gradient.cols {
                        let g = gradient.data[i][j] + self.weight_decay * gradient.data[i][j];
                        res.data[i][j] = self.step(&mut m.data[i][j], &mut v.data[i][j], g);
                    }
                }
                Ok(res)
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        self.m = m;
        self.v = v;
        res
    }

    fn optimize_bias(&mut self, gradient: &[f64]) -> Result<Vec<f64>> {
        let (mut m, mut v) = (self.m_bias.take(), self.v_bias.take());
        let res = match (bias_state_for(&mut m, gradient), bias_state_for(&mut v, gradient)) {
            (Ok(m), Ok(v)) => {
                self.t += 1;
                Ok(m.iter_mut().zip(v.iter_mut()).zip(gradient)
                    .map(|((m, v), &g)| self.step(m, v, g))
                    .collect())
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        self.m_bias = m;
        self.v_bias = v;
        res
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_step_is_learning_rate_times_sign() {
        let mut adam = Adam::new(0.01, 0.9, 0.999, 0.0, 0.0);
        let step = adam.optimize_weights(&Matrix::from_row(vec![3.0, -0.2])).unwrap();
        // m̂ = g, v̂ = g² on the first step
        assert_relative_eq!(step.data[0][0], 0.01, epsilon = 1e-12);
        assert_relative_eq!(step.data[0][1], -0.01, epsilon = 1e-12);
    }

    #[test]
    fn step_counter_is_shared_by_weights_and_bias() {
        let mut adam = Adam::default();
        adam.optimize_weights(&Matrix::from_row(vec![1.0])).unwrap();
        adam.optimize_bias(&[1.0]).unwrap();
        adam.optimize_weights(&Matrix::from_row(vec![1.0])).unwrap();
        assert_eq!(adam.steps(), 3);
    }

    #[test]
    fn bias_correction_uses_shared_counter() {
        let mut adam = Adam::new(1.0, 0.5, 0.5, 0.0, 0.0);
        adam.optimize_weights(&Matrix::from_row(vec![1.0])).unwrap();
        // t = 2 on the first bias call: m = 0.5·g, m̂ = 0.5g / 0.75
        // v = 0.5·g², v̂ = 0.5g² / 0.75
        let step = adam.optimize_bias(&[2.0]).unwrap()[0];
        let m_hat: f64 = 1.0 / 0.75;
        let v_hat: f64 = 2.0 / 0.75;
        assert_relative_eq!(step, m_hat / v_hat.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn weight_decay_feeds_into_the_moments() {
        // With wd the first step still has magnitude lr since m̂/√v̂ = sign(g).
        let mut adam = Adam::new(0.1, 0.9, 0.999, 0.0, 0.5);
        let first = adam.optimize_weights(&Matrix::from_row(vec![2.0])).unwrap();
        assert_relative_eq!(first.data[0][0], 0.1, epsilon = 1e-12);

        // Second step differs from a decay-free run once ε is non-zero.
        let mut plain = Adam::new(0.1, 0.9, 0.999, 1.0, 0.0);
        let mut decayed = Adam::new(0.1, 0.9, 0.999, 1.0, 0.5);
        let g = Matrix::from_row(vec![2.0]);
        let p = plain.optimize_weights(&g).unwrap().data[0][0];
        let d = decayed.optimize_weights(&g).unwrap().data[0][0];
        assert!(d > p);
    }

    #[test]
    fn bias_correction_vanishes_for_large_step_counts() {
        let mut adam = Adam::new(0.1, 0.9, 0.999, 0.0, 0.0);
        adam.t = u64::from(u32::MAX) + 10;
        // t beyond the i32 range: both corrections are exactly 1.
        let step = adam.optimize_bias(&[4.0]).unwrap()[0];
        let m = 0.1 * 4.0;
        let v: f64 = 0.001 * 16.0;
        assert_relative_eq!(step, 0.1 * m / v.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn failed_shape_check_does_not_advance_counter() {
        let mut adam = Adam::default();
        adam.optimize_bias(&[1.0, 2.0]).unwrap();
        assert!(adam.optimize_bias(&[1.0]).is_err());
        assert_eq!(adam.steps(), 1);
    }
}
