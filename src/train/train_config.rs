use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `shuffle`     — reshuffle the sample order before every epoch
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates early (clean shutdown).
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub shuffle: bool,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with shuffling on, no progress channel,
    /// and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            shuffle: true,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
