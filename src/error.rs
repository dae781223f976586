use thiserror::Error;

/// Errors reported by the perceptron core.
///
/// Every variant is detected before any state is mutated, so a failed
/// call leaves the network exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NetworkError {
    /// A flat weight vector whose length disagrees with the network's
    /// connection count.
    #[error("weight vector holds {got} values, network has {expected} connections")]
    ShapeMismatch { expected: usize, got: usize },

    /// A caller-supplied (min, max) pair with min > max.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    /// An input or target slice of the wrong length.
    #[error("expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
