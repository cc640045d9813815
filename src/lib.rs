pub mod errors;
pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod optim;
pub mod data;
pub mod network;
pub mod train;

// Convenience re-exports
pub use errors::{NnError, Result};
pub use math::matrix::{Axis, Matrix};
pub use math::init::{initialize_weights, WeightInit};
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use loss::{LossFunction, LossType, MseLoss, HuberLoss, BceLoss, CrossEntropyLoss};
pub use optim::{Optimizer, OptimizerKind, Sgd, RmsProp, Adam};
pub use data::{Batch, Dataset, Sample};
pub use network::{Network, NetworkSpec, LayerSpec};
pub use train::{train_loop, EpochStats, TrainConfig};
