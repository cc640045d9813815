use std::time::Instant;

use log::{debug, info};

use crate::data::dataset::Dataset;
use crate::errors::{NnError, Result};
use crate::loss::{loss_fn::LossFunction, loss_type::LossType};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the mean batch
/// loss of every epoch, in order.
///
/// # Arguments
/// - `network`:    mutable reference to the network; modified in place
/// - `train`:      training set; reshuffled in place at the start of each epoch
/// - `validation`: optional held-out set, evaluated after every epoch
/// - `config`:     hyperparameters and optional progress channel
///
/// # Errors
/// - `InvalidConfiguration` if the network has no layers, `batch_size == 0`,
///   or truncation leaves no batch to train on.
/// - `InvalidData` if either dataset's widths differ from the network's.
/// - Any `ShapeMismatch` from the layers aborts the run at that batch; the
///   updates already applied are kept.
pub fn train_loop(
    network: &mut Network,
    train: &mut Dataset,
    validation: Option<&Dataset>,
    config: &TrainConfig,
) -> Result<Vec<f64>> {
    if network.layers().is_empty() {
        return Err(NnError::InvalidConfiguration("network has no layers".to_string()));
    }
    network.check_widths(train)?;
    if let Some(val) = validation {
        network.check_widths(val)?;
    }

    info!(
        "training {} epochs on {} examples (batch size {}, truncate {})",
        config.epochs, train.len(), config.batch_size, config.truncate
    );

    let loss_type = network.loss();
    let mut losses = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let train_loss = run_one_epoch(network, train, config)?;
        losses.push(train_loss);

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        // ── Accuracy (CrossEntropy only) ───────────────────────────────────
        let train_accuracy = if loss_type == LossType::CrossEntropy {
            Some(accuracy(network, train)?)
        } else {
            None
        };

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match validation {
            Some(val) if !val.is_empty() => {
                let vl = network.average_loss(val)?;
                let va = if loss_type == LossType::CrossEntropy {
                    Some(accuracy(network, val)?)
                } else {
                    None
                };
                (Some(vl), va)
            }
            _ => (None, None),
        };

        debug!(
            "epoch {}/{}: loss = {:.6}{} ({} ms)",
            epoch,
            config.epochs,
            train_loss,
            val_loss.map(|v| format!(", val_loss = {:.6}", v)).unwrap_or_default(),
            elapsed_ms
        );

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = config.progress_tx {
            let _ = tx.send(EpochStats {
                epoch,
                total_epochs: config.epochs,
                train_loss,
                val_loss,
                train_accuracy,
                val_accuracy,
                elapsed_ms,
            });
        }
    }

    if let Some(last) = losses.last() {
        info!("training finished: final epoch loss = {:.6}", last);
    }

    Ok(losses)
}

/// Fraction of examples whose predicted argmax matches the expected argmax.
pub fn accuracy(network: &mut Network, data: &Dataset) -> Result<f64> {
    if data.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for sample in data.samples() {
        let output = network.forward(&sample.input)?;
        if argmax(&output) == argmax(&sample.output) {
            correct += 1;
        }
    }
    Ok(correct as f64 / data.len() as f64)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Shuffles, batches and runs forward/loss/backward over every batch.
/// Returns the mean loss over batches.
fn run_one_epoch(network: &mut Network, train: &mut Dataset, config: &TrainConfig) -> Result<f64> {
    train.shuffle(network.rng_mut());
    let batches = train.batches(config.batch_size, config.truncate)?;
    if batches.is_empty() {
        return Err(NnError::InvalidConfiguration(format!(
            "no batches to train on ({} examples, batch size {}, truncate {})",
            train.len(), config.batch_size, config.truncate
        )));
    }

    let loss_type = network.loss();
    let mut total_loss = 0.0;

    for batch in &batches {
        let output = network.forward_batch(&batch.inputs, true)?;
        total_loss += loss_type.calc_loss(&output, &batch.expected)?;
        let gradients = loss_type.deriv_loss(&output, &batch.expected)?;
        network.backward(gradients)?;
    }

    Ok(total_loss / batches.len() as f64)
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
