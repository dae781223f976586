use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;

use crate::error::NetworkError;
use crate::network::perceptron::Perceptron;
use crate::optim::MomentumSgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the mean
/// training error of the **last completed epoch**.
///
/// # Arguments
/// - `network`       — mutable reference to the network; modified in place
/// - `train_inputs`  — training samples, each of length `input_size()`
/// - `train_targets` — corresponding targets, same length as `train_inputs`
/// - `val_inputs`    — optional validation samples
/// - `val_targets`   — optional validation targets (required iff `val_inputs` is `Some`)
/// - `optimizer`     — learning rate and momentum for every step
/// - `config`        — epochs, shuffling, optional progress channel, optional stop flag
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Panics
/// Panics if `train_inputs` is empty or the sample/target counts differ.
pub fn train_loop(
    network: &mut Perceptron,
    train_inputs: &[Vec<f64>],
    train_targets: &[Vec<f64>],
    val_inputs: Option<&[Vec<f64>]>,
    val_targets: Option<&[Vec<f64>]>,
    optimizer: &MomentumSgd,
    config: &TrainConfig,
) -> Result<f64, NetworkError> {
    assert!(!train_inputs.is_empty(), "train_inputs must not be empty");
    assert_eq!(
        train_inputs.len(),
        train_targets.len(),
        "train_inputs and train_targets must have equal length"
    );

    let mut last_train_error = 0.0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();

        let train_error = run_one_epoch(
            network,
            train_inputs,
            train_targets,
            optimizer,
            config.shuffle,
        )?;
        last_train_error = train_error;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let val_error = match (val_inputs, val_targets) {
            (Some(vi), Some(vt)) => Some(compute_eval_error(network, vi, vt)?),
            _ => None,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_error,
            val_error,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }

        if stop_requested(config) {
            break;
        }
    }

    Ok(last_train_error)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

/// Runs one full epoch of per-sample training steps.
/// Returns the mean error over all samples.
fn run_one_epoch(
    network: &mut Perceptron,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    optimizer: &MomentumSgd,
    shuffle: bool,
) -> Result<f64, NetworkError> {
    let n = inputs.len();
    let mut total_error = 0.0;

    let mut indices: Vec<usize> = (0..n).collect();
    if shuffle {
        indices.shuffle(&mut rand::thread_rng());
    }

    for &idx in &indices {
        let (_, error) = network.compute_error(&inputs[idx], &targets[idx])?;
        total_error += error;
        network.back_propagate(&targets[idx], optimizer)?;
    }

    Ok(total_error / n as f64)
}

/// Mean error over a dataset without weight updates (eval mode).
fn compute_eval_error(
    network: &mut Perceptron,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
) -> Result<f64, NetworkError> {
    let n = inputs.len();
    if n == 0 {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let (_, error) = network.compute_error(input, target)?;
        total += error;
    }
    Ok(total / n as f64)
}
