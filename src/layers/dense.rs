use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    errors::{NnError, Result},
    math::{init::initialize_weights, matrix::{Axis, Matrix}},
    optim::optimizer::Optimizer,
};

/// What the layer remembers between a forward pass and the backward pass
/// that consumes it.
#[derive(Debug, Clone, Default)]
pub enum LayerState {
    #[default]
    Idle,
    ForwardDone {
        inputs: Matrix,
        pre_activation: Matrix,
        training: bool,
    },
}

/// A fully connected layer: `a = activation(inputs·W + b)`.
///
/// Built with its output width only; the input width is assigned once by
/// the owning `Network` via `attach()`, which also draws the initial weights.
#[derive(Debug)]
pub struct Layer{
    num_inputs: usize,
    num_outputs: usize,
    weights: Matrix,
    bias: Vec<f64>,
    activation: ActivationFunction,
    optimizer: Box<dyn Optimizer>,
    state: LayerState,
    dropout_mask: Option<Vec<bool>>,
}

impl Layer {
    pub fn new(num_outputs: usize, activation: ActivationFunction, optimizer: Box<dyn Optimizer>) -> Layer {
        Layer {
            num_inputs: 0,
            num_outputs,
            weights: Matrix::default(),
            bias: vec![0.0; num_outputs],
            activation,
            optimizer,
            state: LayerState::Idle,
            dropout_mask: None,
        }
    }

    pub fn relu(num_outputs: usize, optimizer: impl Optimizer + 'static) -> Layer {
        Layer::new(num_outputs, ActivationFunction::ReLU, Box::new(optimizer))
    }

    pub fn sigmoid(num_outputs: usize, optimizer: impl Optimizer + 'static) -> Layer {
        Layer::new(num_outputs, ActivationFunction::Sigmoid, Box::new(optimizer))
    }

    pub fn softmax(num_outputs: usize, optimizer: impl Optimizer + 'static) -> Layer {
        Layer::new(num_outputs, ActivationFunction::Softmax, Box::new(optimizer))
    }

    pub fn dropout(num_outputs: usize, optimizer: impl Optimizer + 'static, rate: f64) -> Layer {
        Layer::new(num_outputs, ActivationFunction::Dropout { rate }, Box::new(optimizer))
    }

    /// Fixes the input width and draws the initial weights for this
    /// layer's activation. Bias is reset to zero. Only valid once.
    pub fn attach<R: Rng + ?Sized>(&mut self, num_inputs: usize, rng: &mut R) -> Result<()> {
        if self.is_attached() {
            return Err(NnError::InvalidConfiguration(format!(
                "layer already attached with {} inputs", self.num_inputs
            )));
        }
        if num_inputs == 0 || self.num_outputs == 0 {
            return Err(NnError::InvalidConfiguration(format!(
                "layer dimensions must be non-zero (inputs {}, outputs {})",
                num_inputs, self.num_outputs
            )));
        }
        if let ActivationFunction::Dropout { rate } = self.activation {
            if !(0.0..1.0).contains(&rate) {
                return Err(NnError::InvalidConfiguration(format!(
                    "dropout rate must be in [0, 1), got {}", rate
                )));
            }
        }

        self.num_inputs = num_inputs;
        self.weights = initialize_weights(num_inputs, self.num_outputs, self.activation.weight_init(), rng);
        self.bias = vec![0.0; self.num_outputs];
        Ok(())
    }

    /// Batch forward pass. Caches the inputs and pre-activation for the
    /// next `backward()`; in training mode a Dropout layer draws a fresh
    /// column mask from `rng`.
    pub fn forward<R: Rng + ?Sized>(&mut self, inputs: &Matrix, training: bool, rng: &mut R) -> Result<Matrix> {
        if !self.is_attached() {
            return Err(NnError::InvalidConfiguration(
                "layer must be attached to a network before use".to_string()
            ));
        }

        let z = inputs.multiply(&self.weights)?.add_row_vector(&self.bias)?;

        self.dropout_mask = match self.activation {
            ActivationFunction::Dropout { rate } if training => {
                Some((0..self.num_outputs).map(|_| rng.gen::<f64>() >= rate).collect())
            }
            _ => None,
        };

        let a = self.activation.activate(&z, self.dropout_mask.as_deref());
        self.state = LayerState::ForwardDone {
            inputs: inputs.clone(),
            pre_activation: z,
            training,
        };
        Ok(a)
    }

    /// Single-example inference: runs a one-row batch with training off and
    /// flattens the result.
    pub fn forward_single<R: Rng + ?Sized>(&mut self, input: &[f64], rng: &mut R) -> Result<Vec<f64>> {
        let out = self.forward(&Matrix::from_row(input.to_vec()), false, rng)?;
        Ok(out.mean_along_axis(Axis::Rows))
    }

    /// Backpropagates `gradients` (∂L/∂a, batch × num_outputs), updates the
    /// weights and bias in place through this layer's optimizer, and returns
    /// ∂L/∂inputs for the previous layer.
    ///
    /// Must directly follow a training-mode `forward()`; the cache is
    /// consumed either way.
    pub fn backward(&mut self, gradients: &Matrix) -> Result<Matrix> {
        self.backprop(gradients, false)
    }

    /// Same as `backward()`, but `delta` is already ∂L/∂z (the gradient
    /// w.r.t. the pre-activation), so the activation step is skipped. Used
    /// for a Softmax output trained with categorical cross-entropy, whose
    /// loss derivative `p − y` is taken w.r.t. the logits.
    pub fn backward_pre_activation(&mut self, delta: &Matrix) -> Result<Matrix> {
        self.backprop(delta, true)
    }

    fn backprop(&mut self, gradients: &Matrix, pre_activation_grad: bool) -> Result<Matrix> {
        let (inputs, pre_activation) = match std::mem::take(&mut self.state) {
            LayerState::ForwardDone { inputs, pre_activation, training: true } => (inputs, pre_activation),
            LayerState::ForwardDone { training: false, .. } => {
                return Err(NnError::UndefinedState(
                    "backward pass after an inference-mode forward pass".to_string()
                ));
            }
            LayerState::Idle => {
                return Err(NnError::UndefinedState(
                    "backward pass without a preceding forward pass".to_string()
                ));
            }
        };
        let mask = self.dropout_mask.take();
        let batch_size = inputs.rows as f64;

        let delta = if pre_activation_grad {
            if gradients.shape() != pre_activation.shape() {
                return Err(NnError::shape("backward", gradients.shape(), pre_activation.shape()));
            }
            gradients.clone()
        } else {
            self.activation.backward(gradients, &pre_activation, mask.as_deref())?
        };

        let prev_gradients = delta.multiply(&self.weights.transpose())?;

        let weights_grad = inputs.transpose().multiply(&delta)?.scale(1.0 / batch_size);
        let bias_grad = delta.mean_along_axis(Axis::Rows);

        let weights_step = self.optimizer.optimize_weights(&weights_grad)?;
        let bias_step = self.optimizer.optimize_bias(&bias_grad)?;

        self.weights = self.weights.sub(&weights_step)?;
        for (b, step) in self.bias.iter_mut().zip(&bias_step) {
            *b -= step;
        }

        Ok(prev_gradients)
    }

    pub fn is_attached(&self) -> bool {
        self.num_inputs > 0
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// Keep mask drawn by the last training-mode forward of a Dropout layer.
    pub fn dropout_mask(&self) -> Option<&[bool]> {
        self.dropout_mask.as_deref()
    }

    /// Overwrites the parameters, e.g. to start from known values.
    pub fn set_parameters(&mut self, weights: Matrix, bias: Vec<f64>) -> Result<()> {
        if weights.shape() != (self.num_inputs, self.num_outputs) {
            return Err(NnError::shape("set_parameters", (self.num_inputs, self.num_outputs), weights.shape()));
        }
        if bias.len() != self.num_outputs {
            return Err(NnError::shape("set_parameters", (1, self.num_outputs), (1, bias.len())));
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }
}
