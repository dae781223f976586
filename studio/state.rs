use std::sync::{Arc, Mutex, atomic::AtomicBool, mpsc};

use lamina_nn::{EpochStats, Perceptron};

// ---------------------------------------------------------------------------
// Network plan
// ---------------------------------------------------------------------------

/// The architecture the user sketched in the Setup tab: a name (used as
/// the model file stem) and the caller-facing layer sizes.
#[derive(Debug, Clone)]
pub struct NetworkPlan {
    pub name: String,
    pub layers: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Hyperparams
// ---------------------------------------------------------------------------

/// Training hyperparameters kept separate from the plan so the same
/// architecture can be re-trained with different settings.
#[derive(Debug, Clone)]
pub struct Hyperparams {
    pub learning_rate: f64,
    pub momentum: f64,
    pub epochs: usize,
    pub init_min: f64,
    pub init_max: f64,
    /// Optional clamp applied to every weight update during training.
    pub bounds: Option<(f64, f64)>,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            learning_rate: 0.1,
            momentum: 0.5,
            epochs: 500,
            init_min: -1.0,
            init_max: 1.0,
            bounds: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// One of the built-in function tables, expanded into sample pairs.
#[derive(Debug, Clone)]
pub struct DatasetState {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
    /// Short name displayed in the UI ("sine", "cosine", "xor").
    pub source_name: String,
    /// First rows shown in the Setup preview table.
    pub preview_rows: Vec<(Vec<f64>, Vec<f64>)>,
}

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// No training has been started yet.
    Idle,
    /// Training is running in a background thread.
    Running {
        stop_flag: Arc<AtomicBool>,
        epoch_rx: Arc<Mutex<mpsc::Receiver<EpochStats>>>,
        total_epochs: usize,
    },
    /// Training completed (naturally or via Stop) and the model was saved.
    /// `was_stopped` is true when the user clicked Stop before all epochs
    /// finished.
    Done {
        model_path: String,
        elapsed_total_ms: u64,
        was_stopped: bool,
    },
    /// Training failed with an error.
    Failed {
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Success, Error }

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// Saved architecture from the Setup tab.
    pub plan: Option<NetworkPlan>,
    /// Training hyperparameters.
    pub hyperparams: Option<Hyperparams>,
    /// Selected built-in dataset, expanded into samples.
    pub dataset: Option<DatasetState>,
    /// Current training lifecycle state.
    pub training: TrainingStatus,
    /// History of all epoch stats from the most recent training run.
    pub epoch_history: Vec<EpochStats>,
    /// The trained network (available after training completes).
    pub trained_network: Option<Perceptron>,
    /// One-shot flash message for the next page render.
    pub flash: Option<FlashMessage>,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState {
            plan: None,
            hyperparams: None,
            dataset: None,
            training: TrainingStatus::Idle,
            epoch_history: Vec::new(),
            trained_network: None,
            flash: None,
        }
    }

    /// Returns a bitmask encoding which tabs should be unlocked.
    ///
    /// Bit layout:
    /// - bit 0 (Setup) — always set
    /// - bit 1 (Train) — plan and dataset are both saved
    /// - bit 2 (Test)  — always set
    pub fn tab_unlock_mask(&self) -> u8 {
        let mut mask: u8 = 0b001 | 0b100;
        if self.plan.is_some() && self.dataset.is_some() {
            mask |= 0b010;
        }
        mask
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state type — an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;
