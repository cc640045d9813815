use std::fmt;

use serde::{Serialize, Deserialize};

use crate::errors::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::optim::{adam::Adam, rmsprop::RmsProp, sgd::Sgd};

/// Turns a raw gradient into the delta a layer subtracts from its parameters.
///
/// Each layer owns exactly one optimizer. Running state (caches, moments)
/// is allocated on the first call and shaped after that first gradient; it
/// persists for the lifetime of the layer.
pub trait Optimizer: fmt::Debug {
    fn optimize_weights(&mut self, gradient: &Matrix) -> Result<Matrix>;

    fn optimize_bias(&mut self, gradient: &[f64]) -> Result<Vec<f64>>;

    fn learning_rate(&self) -> f64;
}

/// Serializable optimizer choice, used by `NetworkSpec`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OptimizerKind {
    Sgd {
        learning_rate: f64,
    },
    RmsProp {
        learning_rate: f64,
        decay_rate: f64,
        epsilon: f64,
    },
    Adam {
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        weight_decay: f64,
    },
}

impl OptimizerKind {
    /// Builds a fresh optimizer instance with empty running state.
    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerKind::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
            OptimizerKind::RmsProp { learning_rate, decay_rate, epsilon } => {
                Box::new(RmsProp::new(learning_rate, decay_rate, epsilon))
            }
            OptimizerKind::Adam { learning_rate, beta1, beta2, epsilon, weight_decay } => {
                Box::new(Adam::new(learning_rate, beta1, beta2, epsilon, weight_decay))
            }
        }
    }
}

/// Returns the state matrix, allocating zeros shaped like `gradient` on first use.
pub(crate) fn state_for<'a>(state: &'a mut Option<Matrix>, gradient: &Matrix) -> Result<&'a mut Matrix> {
    let state = state.get_or_insert_with(|| Matrix::zeros(gradient.rows, gradient.cols));
    if state.shape() != gradient.shape() {
        return Err(NnError::shape("optimizer state", state.shape(), gradient.shape()));
    }
    Ok(state)
}

/// Vector counterpart of `state_for`, used for bias state.
pub(crate) fn bias_state_for<'a>(state: &'a mut Option<Vec<f64>>, gradient: &[f64]) -> Result<&'a mut Vec<f64>> {
    let state = state.get_or_insert_with(|| vec![0.0; gradient.len()]);
    if state.len() != gradient.len() {
        return Err(NnError::shape("optimizer bias state", (1, state.len()), (1, gradient.len())));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_json() {
        let kind: OptimizerKind =
            serde_json::from_str(r#"{"type":"sgd","learning_rate":0.5}"#).unwrap();
        assert_eq!(kind, OptimizerKind::Sgd { learning_rate: 0.5 });
        assert_eq!(kind.build().learning_rate(), 0.5);
    }

    #[test]
    fn state_shape_is_fixed_by_first_gradient() {
        let mut state = None;
        state_for(&mut state, &Matrix::zeros(2, 3)).unwrap();
        assert!(state_for(&mut state, &Matrix::zeros(3, 2)).is_err());
        let mut bias = None;
        bias_state_for(&mut bias, &[1.0, 2.0]).unwrap();
        assert!(bias_state_for(&mut bias, &[1.0]).is_err());
    }
}
