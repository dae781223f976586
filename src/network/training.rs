use crate::activation::sigmoid_derivative;
use crate::error::NetworkError;
use crate::loss::SseLoss;
use crate::network::perceptron::Perceptron;
use crate::optim::MomentumSgd;

impl Perceptron {
    /// Runs the forward pass, then aggregates the half sum-of-squares
    /// error of the outputs against `targets`.
    ///
    /// Returns `(outputs, total_error)`. The only state change is the
    /// activation-cache update already performed by the forward pass.
    pub fn compute_error(
        &mut self,
        inputs: &[f64],
        targets: &[f64],
    ) -> Result<(Vec<f64>, f64), NetworkError> {
        let expected = self.output_size();
        if targets.len() != expected {
            return Err(NetworkError::LengthMismatch { expected, got: targets.len() });
        }

        let outputs = self.compute(inputs)?;
        let total_error = SseLoss::loss(&outputs, targets);
        Ok((outputs, total_error))
    }

    /// One training step over the activations left by the last
    /// [`Perceptron::compute`] call.
    ///
    /// Computes the output-layer gradients, propagates them down through
    /// the hidden layers, then applies the momentum update to every
    /// connection, clamping into the configured bounds when set. All
    /// updates are derived from the gradients and activations fixed at
    /// call entry; weight writes never feed back into gradients computed
    /// earlier in the same call.
    pub fn back_propagate(
        &mut self,
        targets: &[f64],
        optimizer: &MomentumSgd,
    ) -> Result<(), NetworkError> {
        let expected = self.output_size();
        if targets.len() != expected {
            return Err(NetworkError::LengthMismatch { expected, got: targets.len() });
        }

        let last = self.layer_sizes.len() - 1;

        // Output-layer gradient: derivative of the squared error through
        // the sigmoid, -(t - o) * o * (1 - o).
        for k in 1..self.layer_sizes[last] {
            let o = self.outputs[last][k];
            self.gradients[last][k] = -(targets[k - 1] - o) * sigmoid_derivative(o);
        }

        // Hidden-layer gradients, second-to-last layer down to the first
        // hidden layer. Bias slots receive none: no connection ends there.
        for layer in (1..last).rev() {
            for j in 1..self.layer_sizes[layer] {
                let mut sum = 0.0;
                for k in 1..self.layer_sizes[layer + 1] {
                    sum += self.gradients[layer + 1][k] * self.weights[layer][j][k];
                }
                self.gradients[layer][j] = sum * sigmoid_derivative(self.outputs[layer][j]);
            }
        }

        // Weight updates, last transition down to the first.
        let lr = optimizer.learning_rate;
        let alpha = optimizer.momentum;
        for layer in (1..=last).rev() {
            for dst in 1..self.layer_sizes[layer] {
                for src in 0..self.layer_sizes[layer - 1] {
                    let raw = self.gradients[layer][dst] * self.outputs[layer - 1][src];
                    let variation = -(1.0 - alpha) * lr * raw
                        + alpha * self.variations[layer - 1][src][dst];

                    let mut weight = self.weights[layer - 1][src][dst] + variation;
                    if let Some((min, max)) = self.bounds {
                        weight = weight.clamp(min, max);
                    }

                    self.variations[layer - 1][src][dst] = variation;
                    self.weights[layer - 1][src][dst] = weight;
                }
            }
        }

        Ok(())
    }
}
