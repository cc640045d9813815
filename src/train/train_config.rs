use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`:      total number of full passes over the training data
/// - `batch_size`:  examples per mini-batch; use `1` for online training
/// - `truncate`:    drop the trailing short batch instead of training on it
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///                   completed epoch. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub truncate: bool,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` that truncates short batches and reports no progress.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            truncate: true,
            progress_tx: None,
        }
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}
