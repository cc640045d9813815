pub mod dense;

pub use dense::{Layer, LayerState};
