use log::trace;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    activation::activation::ActivationFunction,
    data::dataset::Dataset,
    errors::{NnError, Result},
    layers::dense::Layer,
    loss::{loss_fn::LossFunction, loss_type::LossType},
    math::matrix::Matrix,
    train::{loop_fn::train_loop, train_config::TrainConfig},
};

/// An ordered stack of layers trained against one loss.
///
/// Layers are appended with `add_layer`, which chains widths automatically:
/// the first layer reads `input_size` values, every later one reads the
/// previous layer's outputs. The network owns the random source used for
/// weight initialization, shuffling and dropout masks.
#[derive(Debug)]
pub struct Network {
    input_size: usize,
    layers: Vec<Layer>,
    loss: LossType,
    rng: StdRng,
}

impl Network {
    /// Creates an empty network seeded from OS entropy.
    pub fn new(input_size: usize, loss: LossType) -> Network {
        Network::with_rng(input_size, loss, StdRng::from_entropy())
    }

    /// Creates an empty network with a fixed seed for reproducible runs.
    pub fn with_seed(input_size: usize, loss: LossType, seed: u64) -> Network {
        Network::with_rng(input_size, loss, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(input_size: usize, loss: LossType, rng: StdRng) -> Network {
        Network {
            input_size,
            layers: Vec::new(),
            loss,
            rng,
        }
    }

    /// Appends `layer`, wiring its input width and drawing its weights.
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<()> {
        if self.input_size == 0 {
            return Err(NnError::InvalidConfiguration(
                "network input size must be set before adding layers".to_string()
            ));
        }

        let num_inputs = self.layers.last()
            .map(Layer::num_outputs)
            .unwrap_or(self.input_size);
        layer.attach(num_inputs, &mut self.rng)?;

        trace!(
            "attached layer {} ({:?}): {} -> {}",
            self.layers.len(), layer.activation(), num_inputs, layer.num_outputs()
        );
        self.layers.push(layer);
        Ok(())
    }

    /// Single-example inference.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.ensure_layers()?;
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            current = layer.forward_single(&current, &mut self.rng)?;
        }
        Ok(current)
    }

    /// Folds a batch through every layer in order.
    pub fn forward_batch(&mut self, inputs: &Matrix, training: bool) -> Result<Matrix> {
        self.ensure_layers()?;
        let mut current = inputs.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current, training, &mut self.rng)?;
        }
        Ok(current)
    }

    /// Propagates the loss derivative back through the layers, last to
    /// first. Each layer updates its own parameters on the way.
    ///
    /// For a Softmax output under `CrossEntropy` the loss derivative is
    /// already w.r.t. the logits, so the output layer skips its activation
    /// step.
    pub fn backward(&mut self, gradients: Matrix) -> Result<()> {
        self.ensure_layers()?;
        let fused_output = self.softmax_cross_entropy();
        let last = self.layers.len().saturating_sub(1);
        let mut gradient = gradients;
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            gradient = if fused_output && i == last {
                layer.backward_pre_activation(&gradient)?
            } else {
                layer.backward(&gradient)?
            };
        }
        Ok(())
    }

    /// Trains for `epochs` passes and returns the mean batch loss per epoch.
    ///
    /// `data` is reshuffled in place at the start of every epoch.
    pub fn train(&mut self, data: &mut Dataset, batch_size: usize, epochs: usize, truncate: bool) -> Result<Vec<f64>> {
        let config = TrainConfig::new(epochs, batch_size).truncate(truncate);
        train_loop(self, data, None, &config)
    }

    /// Mean loss over `data` in its current order, one example per batch,
    /// inference mode.
    pub fn average_loss(&mut self, data: &Dataset) -> Result<f64> {
        self.ensure_layers()?;
        if data.is_empty() {
            return Err(NnError::InvalidData("cannot evaluate loss on an empty dataset".to_string()));
        }
        self.check_widths(data)?;

        let batches = data.batches(1, true)?;
        let mut total = 0.0;
        for batch in &batches {
            let output = self.forward_batch(&batch.inputs, false)?;
            total += self.loss.calc_loss(&output, &batch.expected)?;
        }
        Ok(total / batches.len() as f64)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the layers, e.g. to load known parameters.
    /// Widths stay fixed once attached.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the last layer, or the input width for an empty network.
    pub fn output_size(&self) -> usize {
        self.layers.last().map(Layer::num_outputs).unwrap_or(self.input_size)
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Rejects a non-empty dataset whose input or output width differs from
    /// what this network reads and produces.
    pub(crate) fn check_widths(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        if data.input_width() != self.input_size() || data.output_width() != self.output_size() {
            return Err(NnError::InvalidData(format!(
                "dataset is {} -> {} but the network is {} -> {}",
                data.input_width(), data.output_width(), self.input_size(), self.output_size()
            )));
        }
        Ok(())
    }

    fn softmax_cross_entropy(&self) -> bool {
        self.loss == LossType::CrossEntropy
            && self.layers.last().map(Layer::activation) == Some(ActivationFunction::Softmax)
    }

    fn ensure_layers(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfiguration("network has no layers".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::{adam::Adam, sgd::Sgd};

    #[test]
    fn widths_chain_through_added_layers() {
        let mut net = Network::with_seed(3, LossType::Mse, 1);
        net.add_layer(Layer::relu(5, Sgd::new(0.1))).unwrap();
        net.add_layer(Layer::sigmoid(2, Adam::default())).unwrap();
        assert_eq!(net.layers()[0].num_inputs(), 3);
        assert_eq!(net.layers()[1].num_inputs(), 5);
        assert_eq!(net.output_size(), 2);
    }

    #[test]
    fn zero_input_size_cannot_take_layers() {
        let mut net = Network::with_seed(0, LossType::Mse, 1);
        assert!(matches!(
            net.add_layer(Layer::relu(1, Sgd::new(0.1))),
            Err(NnError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_network_cannot_evaluate() {
        let mut net = Network::with_seed(2, LossType::Mse, 1);
        let data = Dataset::from_rows(&[vec![1.0, 2.0]], &[vec![1.0]]).unwrap();
        assert!(matches!(net.average_loss(&data), Err(NnError::InvalidConfiguration(_))));
        assert!(matches!(net.forward(&[1.0, 2.0]), Err(NnError::InvalidConfiguration(_))));
    }

    #[test]
    fn identity_like_layer_passes_input_through() {
        let mut net = Network::with_seed(2, LossType::Mse, 1);
        net.add_layer(Layer::relu(2, Sgd::new(0.1))).unwrap();
        let identity = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        net.layers_mut()[0].set_parameters(identity, vec![0.0, 0.0]).unwrap();
        assert_eq!(net.forward(&[0.25, 3.0]).unwrap(), vec![0.25, 3.0]);
    }

    #[test]
    fn single_and_batch_forward_agree() {
        let mut net = Network::with_seed(2, LossType::Mse, 5);
        net.add_layer(Layer::relu(4, Sgd::new(0.1))).unwrap();
        net.add_layer(Layer::sigmoid(1, Sgd::new(0.1))).unwrap();
        let single = net.forward(&[0.5, -0.5]).unwrap();
        let batch = net
            .forward_batch(&Matrix::from_data(vec![vec![0.5, -0.5], vec![1.0, 1.0]]).unwrap(), false)
            .unwrap();
        assert_eq!(single, batch.data[0]);
    }

    #[test]
    fn empty_network_cannot_backpropagate() {
        let mut net = Network::with_seed(1, LossType::Mse, 1);
        assert!(matches!(
            net.backward(Matrix::from_row(vec![1.0])),
            Err(NnError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn backward_requires_training_forward() {
        let mut net = Network::with_seed(1, LossType::Mse, 1);
        net.add_layer(Layer::relu(1, Sgd::new(0.1))).unwrap();
        net.forward(&[1.0]).unwrap();
        assert!(matches!(
            net.backward(Matrix::from_row(vec![1.0])),
            Err(NnError::UndefinedState(_))
        ));
    }

    #[test]
    fn dataset_widths_must_match_the_network() {
        let mut net = Network::with_seed(2, LossType::Mse, 1);
        net.add_layer(Layer::relu(1, Sgd::new(0.1))).unwrap();
        let wrong_input = Dataset::from_rows(&[vec![1.0, 2.0, 3.0]], &[vec![0.0]]).unwrap();
        let wrong_output = Dataset::from_rows(&[vec![1.0, 2.0]], &[vec![0.0, 1.0]]).unwrap();
        assert!(matches!(net.average_loss(&wrong_input), Err(NnError::InvalidData(_))));
        assert!(matches!(net.average_loss(&wrong_output), Err(NnError::InvalidData(_))));
        let ok = Dataset::from_rows(&[vec![1.0, 2.0]], &[vec![0.0]]).unwrap();
        assert!(net.average_loss(&ok).is_ok());
    }

    #[test]
    fn average_loss_is_mean_of_per_example_losses() {
        let mut net = Network::with_seed(1, LossType::Mse, 1);
        net.add_layer(Layer::relu(1, Sgd::new(0.1))).unwrap();
        net.layers_mut()[0].set_parameters(Matrix::from_row(vec![1.0]), vec![0.0]).unwrap();
        let data = Dataset::from_rows(&[vec![1.0], vec![2.0]], &[vec![0.0], vec![0.0]]).unwrap();
        // (1 + 4) / 2
        assert_eq!(net.average_loss(&data).unwrap(), 2.5);
    }
}
