//! Error types shared by every stage of the engine.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Errors raised while wiring, running or training a network.
///
/// Non-finite values (e.g. `ln(0)` inside a cross-entropy loss) are *not*
/// reported here; they propagate silently through the computation.
#[derive(Debug, Error)]
pub enum NnError {
    /// Operand dimensions are incompatible for the requested operation.
    #[error("Shape mismatch in {op}: left is {}x{}, right is {}x{}", left.0, left.1, right.0, right.1)]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// The network or one of its layers was wired incorrectly.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A layer was asked to do something its cached state does not allow,
    /// e.g. a backward pass without a preceding training-mode forward pass.
    #[error("Undefined state: {0}")]
    UndefinedState(String),

    /// Input data is malformed (ragged rows, empty dataset, ...).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NnError {
    pub(crate) fn shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> NnError {
        NnError::ShapeMismatch { op, left, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message_names_both_shapes() {
        let err = NnError::shape("multiply", (2, 3), (4, 5));
        assert_eq!(
            err.to_string(),
            "Shape mismatch in multiply: left is 2x3, right is 4x5"
        );
    }
}
