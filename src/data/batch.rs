use crate::math::matrix::Matrix;

/// Inputs and expected outputs for one training step; row `i` of each
/// belongs to the same example.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Matrix,
    pub expected: Matrix,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.inputs.rows
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.rows == 0
    }
}
