use crate::errors::{NnError, Result};
use crate::math::matrix::Matrix;

/// Contract shared by every loss.
///
/// `calc_loss` sums the per-element loss and divides by the batch size (row
/// count). `deriv_loss` returns the per-element partial derivative w.r.t. the
/// output, *not* averaged over the batch; layers do that when forming weight
/// gradients.
pub trait LossFunction {
    fn calc_loss(&self, output: &Matrix, expected: &Matrix) -> Result<f64>;

    fn deriv_loss(&self, output: &Matrix, expected: &Matrix) -> Result<Matrix>;
}

/// Sums `per_element(output, expected)` over every cell and divides by the row count.
pub(crate) fn batch_mean<F>(output: &Matrix, expected: &Matrix, op: &'static str, per_element: F) -> Result<f64>
where
    F: Fn(f64, f64) -> f64,
{
    check_shapes(output, expected, op)?;
    let total: f64 = output.data.iter().zip(&expected.data)
        .flat_map(|(o_row, e_row)| o_row.iter().zip(e_row))
        .map(|(&o, &e)| per_element(o, e))
        .sum();
    Ok(total / output.rows as f64)
}

/// Applies `per_element(output, expected)` cell by cell.
pub(crate) fn elementwise<F>(output: &Matrix, expected: &Matrix, op: &'static str, per_element: F) -> Result<Matrix>
where
    F: Fn(f64, f64) -> f64,
{
    check_shapes(output, expected, op)?;
    Ok(Matrix {
        rows: output.rows,
        cols: output.cols,
        data: output.data.iter().zip(&expected.data)
            .map(|(o_row, e_row)| o_row.iter().zip(e_row).map(|(&o, &e)| per_element(o, e)).collect())
            .collect(),
    })
}

fn check_shapes(output: &Matrix, expected: &Matrix, op: &'static str) -> Result<()> {
    if output.shape() != expected.shape() {
        return Err(NnError::shape(op, output.shape(), expected.shape()));
    }
    Ok(())
}
