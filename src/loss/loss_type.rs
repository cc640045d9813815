use serde::{Serialize, Deserialize};

use crate::errors::Result;
use crate::loss::{
    bce::BceLoss,
    cross_entropy::CrossEntropyLoss,
    huber::{HuberLoss, DEFAULT_DELTA},
    loss_fn::LossFunction,
    mse::MseLoss,
};
use crate::math::matrix::Matrix;

/// Selects which loss function a network is trained against.
///
/// - `Mse`:                mean-squared error; pair with ReLU or Sigmoid output.
/// - `Huber`:              Huber loss with threshold `delta`.
/// - `BinaryCrossEntropy`: pair with Sigmoid output.
/// - `CrossEntropy`:       categorical cross-entropy; pair with Softmax output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    Huber {
        #[serde(default = "default_delta")]
        delta: f64,
    },
    BinaryCrossEntropy,
    CrossEntropy,
}

fn default_delta() -> f64 {
    DEFAULT_DELTA
}

impl LossFunction for LossType {
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64> {
        match *self {
            LossType::Mse                => MseLoss.calc_loss(output, expected),
            LossType::Huber { delta }    => HuberLoss::new(delta).calc_loss(output, expected),
            LossType::BinaryCrossEntropy => BceLoss.calc_loss(output, expected),
            LossType::CrossEntropy       => CrossEntropyLoss.calc_loss(output, expected),
        }
    }

    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix> {
        match *self {
            LossType::Mse                => MseLoss.deriv_loss(output, expected),
            LossType::Huber { delta }    => HuberLoss::new(delta).deriv_loss(output, expected),
            LossType::BinaryCrossEntropy => BceLoss.deriv_loss(output, expected),
            LossType::CrossEntropy       => CrossEntropyLoss.deriv_loss(output, expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&LossType::Mse).unwrap(), "\"mse\"");
        let huber: LossType = serde_json::from_str(r#"{"huber":{}}"#).unwrap();
        assert_eq!(huber, LossType::Huber { delta: 1.0 });
    }

    #[test]
    fn dispatches_to_the_selected_loss() {
        let output = Matrix::from_row(vec![3.0]);
        let expected = Matrix::from_row(vec![0.0]);
        assert_eq!(LossType::Mse.calc_loss(&output, &expected).unwrap(), 9.0);
        assert_eq!(
            LossType::Huber { delta: 1.0 }.calc_loss(&output, &expected).unwrap(),
            2.5
        );
    }
}
