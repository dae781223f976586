/// Gradient-descent-with-momentum hyperparameters.
///
/// One training step blends the fresh gradient step with the previous
/// update of the same connection:
///
/// `variation = -(1 - momentum) * learning_rate * gradient + momentum * previous_variation`
#[derive(Debug, Clone, Copy)]
pub struct MomentumSgd {
    pub learning_rate: f64,
    /// Inertia factor in [0, 1); 0 disables momentum entirely.
    pub momentum: f64,
}

impl MomentumSgd {
    pub fn new(learning_rate: f64, momentum: f64) -> MomentumSgd {
        MomentumSgd { learning_rate, momentum }
    }
}

impl Default for MomentumSgd {
    fn default() -> Self {
        MomentumSgd { learning_rate: 0.1, momentum: 0.5 }
    }
}
