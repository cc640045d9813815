use rand::Rng;

use crate::math::matrix::Matrix;

/// Uniform weight-initialization schemes. Each draws from `[-limit, limit]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightInit {
    /// He: `limit = sqrt(2 / fan_in)`. Used ahead of ReLU.
    He,
    /// `limit = 1 / sqrt(fan_in)`. Used ahead of Sigmoid.
    LeCun,
    /// Xavier/Glorot: `limit = sqrt(6 / (fan_in + fan_out))`.
    Glorot,
}

impl WeightInit {
    pub fn limit(self, num_inputs: usize, num_outputs: usize) -> f64 {
        match self {
            WeightInit::He => (2.0 / num_inputs as f64).sqrt(),
            WeightInit::LeCun => 1.0 / (num_inputs as f64).sqrt(),
            WeightInit::Glorot => (6.0 / (num_inputs + num_outputs) as f64).sqrt(),
        }
    }
}

/// Allocates a `num_inputs x num_outputs` weight matrix filled per `scheme`.
///
/// Called once by the network when a layer is attached.
pub fn initialize_weights<R: Rng + ?Sized>(
    num_inputs: usize,
    num_outputs: usize,
    scheme: WeightInit,
    rng: &mut R,
) -> Matrix {
    let limit = scheme.limit(num_inputs, num_outputs);
    let mut res = Matrix::zeros(num_inputs, num_outputs);

    for i in 0..num_inputs {
        for j in 0..num_outputs {
            res.data[i][j] = rng.gen::<f64>() * 2.0 * limit - limit;
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn limits_follow_each_scheme() {
        assert_relative_eq!(WeightInit::He.limit(8, 3), 0.5);
        assert_relative_eq!(WeightInit::LeCun.limit(4, 3), 0.5);
        assert_relative_eq!(WeightInit::Glorot.limit(2, 1), 2.0_f64.sqrt());
    }

    #[test]
    fn weights_stay_within_limit() {
        let mut rng = StdRng::seed_from_u64(7);
        for scheme in [WeightInit::He, WeightInit::LeCun, WeightInit::Glorot] {
            let w = initialize_weights(16, 5, scheme, &mut rng);
            assert_eq!(w.shape(), (16, 5));
            let limit = scheme.limit(16, 5);
            assert!(w.data.iter().flatten().all(|x| x.abs() <= limit));
            assert!(w.data.iter().flatten().any(|&x| x != 0.0));
        }
    }

    #[test]
    fn same_seed_same_weights() {
        let a = initialize_weights(3, 3, WeightInit::He, &mut StdRng::seed_from_u64(1));
        let b = initialize_weights(3, 3, WeightInit::He, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
