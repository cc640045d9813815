pub mod matrix;
pub mod init;

pub use matrix::{Axis, Matrix};
pub use init::{initialize_weights, WeightInit};
