pub mod batch;
pub mod dataset;

pub use batch::Batch;
pub use dataset::{Dataset, Sample};
