use serde::{Serialize, Deserialize};

/// Snapshot of one finished epoch, sent over `TrainConfig::progress_tx`.
///
/// Accuracy fields are argmax-based and only filled in when the network
/// trains against `LossType::CrossEntropy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// Counts from 1.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Same value `train_loop` returns for this epoch: the mean over batches.
    pub train_loss: f64,
    /// `Network::average_loss` on the validation set.
    pub val_loss: Option<f64>,
    pub train_accuracy: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Time spent in the forward/backward pass of this epoch, evaluation excluded.
    pub elapsed_ms: u64,
}
