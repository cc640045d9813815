use rand::Rng;

use crate::data::batch::Batch;
use crate::errors::{NnError, Result};
use crate::math::matrix::Matrix;

/// One `(input, expected output)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Sample {
        Sample { input, output }
    }
}

/// In-memory dataset of paired examples with a fixed input and output width.
///
/// Loaders (CSV, IDX, ...) live outside the engine; they hand over rows and
/// this type validates that widths are consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
    input_width: usize,
    output_width: usize,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Result<Dataset> {
        let (input_width, output_width) = samples.first()
            .map(|s| (s.input.len(), s.output.len()))
            .unwrap_or((0, 0));

        for (i, sample) in samples.iter().enumerate() {
            if sample.input.len() != input_width || sample.output.len() != output_width {
                return Err(NnError::InvalidData(format!(
                    "sample {} has widths ({}, {}), expected ({}, {})",
                    i, sample.input.len(), sample.output.len(), input_width, output_width
                )));
            }
        }

        Ok(Dataset { samples, input_width, output_width })
    }

    /// Pairs `inputs[i]` with `outputs[i]`.
    pub fn from_rows(inputs: &[Vec<f64>], outputs: &[Vec<f64>]) -> Result<Dataset> {
        if inputs.len() != outputs.len() {
            return Err(NnError::InvalidData(format!(
                "{} inputs but {} outputs", inputs.len(), outputs.len()
            )));
        }
        Dataset::new(
            inputs.iter().zip(outputs)
                .map(|(i, o)| Sample::new(i.clone(), o.clone()))
                .collect()
        )
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn output_width(&self) -> usize {
        self.output_width
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Fisher–Yates shuffle in place: for `i` from the last index down to 0,
    /// swap with a uniform `j` in `[0, i]`. Pairs move together.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in (0..self.samples.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.samples.swap(i, j);
        }
    }

    /// Slices the dataset, in its current order, into batches of
    /// `batch_size` rows. A remainder becomes a short final batch unless
    /// `truncate` is set, in which case it is dropped.
    pub fn batches(&self, batch_size: usize, truncate: bool) -> Result<Vec<Batch>> {
        if batch_size == 0 {
            return Err(NnError::InvalidConfiguration("batch_size must be at least 1".to_string()));
        }

        Ok(self.samples
            .chunks(batch_size)
            .filter(|chunk| !truncate || chunk.len() == batch_size)
            .map(|chunk| Batch {
                inputs: stack(chunk.iter().map(|s| &s.input), self.input_width),
                expected: stack(chunk.iter().map(|s| &s.output), self.output_width),
            })
            .collect())
    }
}

fn stack<'a>(rows: impl Iterator<Item = &'a Vec<f64>>, width: usize) -> Matrix {
    let data: Vec<Vec<f64>> = rows.cloned().collect();
    Matrix { rows: data.len(), cols: width, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn numbered(n: usize) -> Dataset {
        Dataset::new(
            (0..n).map(|i| Sample::new(vec![i as f64, 1.0], vec![-(i as f64)])).collect()
        ).unwrap()
    }

    #[test]
    fn ragged_samples_are_rejected() {
        let res = Dataset::new(vec![
            Sample::new(vec![1.0, 2.0], vec![0.0]),
            Sample::new(vec![1.0], vec![0.0]),
        ]);
        assert!(matches!(res, Err(NnError::InvalidData(_))));
        assert!(Dataset::from_rows(&[vec![1.0]], &[]).is_err());
    }

    #[test]
    fn batch_sizes_with_and_without_truncation() {
        let data = numbered(10);
        let sizes = |truncate| -> Vec<usize> {
            data.batches(4, truncate).unwrap().iter().map(Batch::len).collect()
        };
        assert_eq!(sizes(false), vec![4, 4, 2]);
        assert_eq!(sizes(true), vec![4, 4]);
    }

    #[test]
    fn batches_preserve_order_and_widths() {
        let batches = numbered(5).batches(2, false).unwrap();
        assert_eq!(batches[0].inputs.shape(), (2, 2));
        assert_eq!(batches[0].expected.shape(), (2, 1));
        assert_eq!(batches[1].inputs.data[0][0], 2.0);
        assert_eq!(batches[2].expected.data, vec![vec![-4.0]]);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(matches!(
            numbered(3).batches(0, true),
            Err(NnError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn shuffle_permutes_without_splitting_pairs() {
        let mut data = numbered(50);
        data.shuffle(&mut StdRng::seed_from_u64(3));

        let mut seen: Vec<usize> = data.samples().iter()
            .map(|s| {
                assert_eq!(s.output[0], -s.input[0]);
                s.input[0] as usize
            })
            .collect();
        assert_ne!(seen, (0..50).collect::<Vec<_>>());
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let mut a = numbered(20);
        let mut b = numbered(20);
        a.shuffle(&mut StdRng::seed_from_u64(9));
        b.shuffle(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
