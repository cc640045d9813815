use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::errors::Result;
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossType;
use crate::network::network::Network;
use crate::optim::optimizer::OptimizerKind;

/// Describes one layer of a `NetworkSpec`.
///
/// Fields:
/// - `size`:       number of outputs of this layer; the input width is
///                  implied by the previous layer (or the network input)
/// - `activation`: activation applied after the linear transform
/// - `optimizer`:  update rule this layer's parameters are trained with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
    pub optimizer: OptimizerKind,
}

/// A serializable description of a network architecture plus its loss.
///
/// Only the architecture is stored; trained weights are not part of this
/// format. `build()` produces a freshly initialized `Network`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Width of every input vector.
    pub input_size: usize,
    /// Loss function the network is trained against.
    pub loss: LossType,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    pub fn build(&self) -> Result<Network> {
        self.populate(Network::new(self.input_size, self.loss))
    }

    pub fn build_with_seed(&self, seed: u64) -> Result<Network> {
        self.populate(Network::with_seed(self.input_size, self.loss, seed))
    }

    fn populate(&self, mut network: Network) -> Result<Network> {
        for spec in &self.layers {
            network.add_layer(Layer::new(spec.size, spec.activation, spec.optimizer.build()))?;
        }
        Ok(network)
    }

    /// Serializes this network description to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
