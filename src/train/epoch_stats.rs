use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the
/// training loop sends one `EpochStats` value at the end of every
/// completed epoch. Receivers (e.g. the studio SSE handler) use this to
/// drive real-time error charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean error over all training samples in this epoch.
    pub train_error: f64,
    /// Mean error over the validation set, if one was provided.
    pub val_error: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
