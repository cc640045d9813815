use crate::errors::{NnError, Result};

/// Dense row-major matrix of `f64`.
///
/// Rows are batch entries (or fan-in for weight matrices), columns are
/// features. Binary operations check shapes and return
/// `NnError::ShapeMismatch` instead of panicking.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

/// Which dimension `mean_along_axis` collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Average over rows: one value per column (reduces the batch dimension).
    Rows,
    /// Average over columns: one value per row.
    Columns,
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from nested rows. Every row must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map(|row| row.len()).unwrap_or(0);
        if let Some(i) = data.iter().position(|row| row.len() != cols) {
            return Err(NnError::InvalidData(format!(
                "row {} has {} columns, expected {}",
                i,
                data[i].len(),
                cols
            )));
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// Wraps a single vector as a one-row matrix.
    pub fn from_row(row: Vec<f64>) -> Matrix {
        Matrix {
            rows: 1,
            cols: row.len(),
            data: vec![row]
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Standard matrix product. Requires `self.cols == rhs.rows`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::shape("multiply", self.shape(), rhs.shape()));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Adds `vector` to every row. `vector.len()` must equal `self.cols`.
    pub fn add_row_vector(&self, vector: &[f64]) -> Result<Matrix> {
        if vector.len() != self.cols {
            return Err(NnError::shape("add_row_vector", self.shape(), (1, vector.len())));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().zip(vector).map(|(x, b)| x + b).collect())
                .collect()
        })
    }

    /// Averages along `axis`.
    ///
    /// `Axis::Rows` yields `cols` values (per-column means over the batch),
    /// `Axis::Columns` yields `rows` values (per-row means over features).
    pub fn mean_along_axis(&self, axis: Axis) -> Vec<f64> {
        match axis {
            Axis::Rows => {
                let mut means = vec![0.0; self.cols];
                for row in &self.data {
                    for (m, x) in means.iter_mut().zip(row) {
                        *m += x;
                    }
                }
                let n = self.rows as f64;
                means.iter_mut().for_each(|m| *m /= n);
                means
            }
            Axis::Columns => {
                let n = self.cols as f64;
                self.data.iter()
                    .map(|row| row.iter().sum::<f64>() / n)
                    .collect()
            }
        }
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(NnError::shape(op, self.shape(), rhs.shape()));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data)
                .map(|(row_a, row_b)| {
                    row_a.iter().zip(row_b).map(|(&a, &b)| functor(a, b)).collect()
                })
                .collect()
        })
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
