pub struct SseLoss;

impl SseLoss {
    /// Scalar half sum-of-squares: 0.5 * Σ (expected - predicted)²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        0.5 * predicted.iter().zip(expected.iter())
            .map(|(o, t)| (t - o).powi(2))
            .sum::<f64>()
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(o, t)| o - t)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_is_half_squared_distance() {
        let loss = SseLoss::loss(&[0.0, 1.0], &[1.0, 1.0]);
        assert!((loss - 0.5).abs() < 1e-12);
    }

    #[test]
    fn loss_is_zero_on_exact_match() {
        assert_eq!(SseLoss::loss(&[0.25, 0.75], &[0.25, 0.75]), 0.0);
    }

    #[test]
    fn derivative_points_from_target_to_output() {
        let grad = SseLoss::derivative(&[0.8, 0.2], &[1.0, 0.0]);
        assert!((grad[0] - (-0.2)).abs() < 1e-12);
        assert!((grad[1] - 0.2).abs() < 1e-12);
    }
}
