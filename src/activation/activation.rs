use std::f64::consts::E;

/// Logistic sigmoid: maps any real value into (0, 1).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// Sigmoid derivative expressed from the already-activated output:
/// for o = sigmoid(x), s'(x) = o * (1 - o).
pub fn sigmoid_derivative(output: f64) -> f64 {
    output * (1.0 - output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_at_zero_is_half() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_is_symmetric_around_half() {
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sigmoid_stays_in_open_unit_interval() {
        for x in [-50.0, -1.0, 0.0, 1.0, 50.0] {
            let s = sigmoid(x);
            assert!(s > 0.0 && s < 1.0);
        }
    }

    #[test]
    fn derivative_peaks_at_half() {
        assert!((sigmoid_derivative(0.5) - 0.25).abs() < 1e-12);
        assert!(sigmoid_derivative(0.1) < 0.25);
        assert!(sigmoid_derivative(0.9) < 0.25);
    }
}
