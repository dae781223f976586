use rand::prelude::*;
use serde::{Serialize, Deserialize};

use crate::activation::sigmoid;
use crate::error::NetworkError;

/// A multilayer feedforward perceptron with one bias neuron per layer.
///
/// Slot 0 of every layer is a synthetic bias neuron whose output stays
/// pinned at 1.0. Connections originate at any source slot (bias
/// included) and terminate only at non-bias destination slots, which
/// keeps the forward and backward loops uniform over real and
/// bias-sourced connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perceptron {
    /// Per-layer neuron counts, bias slot included.
    pub(crate) layer_sizes: Vec<usize>,
    /// `outputs[layer][neuron]` — activation cache of the last forward pass.
    pub(crate) outputs: Vec<Vec<f64>>,
    /// `gradients[layer][neuron]` — error signals of the last backward pass.
    pub(crate) gradients: Vec<Vec<f64>>,
    /// `weights[layer][src][dst]` — weight of the connection from `src`
    /// in `layer` to `dst` in `layer + 1`. Destination slot 0 is
    /// allocated but never written: no connection enters a bias neuron.
    pub(crate) weights: Vec<Vec<Vec<f64>>>,
    /// Previous update applied to each connection, same shape as `weights`.
    pub(crate) variations: Vec<Vec<Vec<f64>>>,
    /// Optional (min, max) clamp applied to every weight update.
    pub(crate) bounds: Option<(f64, f64)>,
}

impl Perceptron {
    /// Builds a network from caller-facing layer sizes (bias excluded).
    ///
    /// Every size is incremented internally to host the bias slot. All
    /// weights start at zero; call [`Perceptron::randomize_weights`] or
    /// [`Perceptron::set_weights`] before the first forward pass.
    ///
    /// # Panics
    /// Panics if fewer than two layers are given or any size is zero.
    pub fn new(sizes: &[usize]) -> Perceptron {
        assert!(sizes.len() >= 2, "a network needs at least an input and an output layer");
        assert!(sizes.iter().all(|&s| s > 0), "layer sizes must be positive");

        let layer_sizes: Vec<usize> = sizes.iter().map(|&s| s + 1).collect();

        let outputs: Vec<Vec<f64>> = layer_sizes.iter()
            .map(|&size| {
                let mut values = vec![0.0; size];
                values[0] = 1.0; // bias slot, never reassigned
                values
            })
            .collect();

        let gradients: Vec<Vec<f64>> = layer_sizes.iter()
            .map(|&size| vec![0.0; size])
            .collect();

        let weights = alloc_store(&layer_sizes);
        let variations = alloc_store(&layer_sizes);

        Perceptron { layer_sizes, outputs, gradients, weights, variations, bounds: None }
    }

    /// Number of real (non-bias) inputs the network accepts.
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0] - 1
    }

    /// Number of real (non-bias) outputs the network produces.
    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1] - 1
    }

    /// Caller-facing layer sizes, bias slots excluded.
    pub fn topology(&self) -> Vec<usize> {
        self.layer_sizes.iter().map(|&s| s - 1).collect()
    }

    /// Activation cache left by the last forward pass, bias slots included.
    pub fn activations(&self) -> &[Vec<f64>] {
        &self.outputs
    }

    /// Total connection count. Every non-bias destination neuron connects
    /// to all source slots (bias included) of the previous layer.
    pub fn weight_count(&self) -> usize {
        self.layer_sizes.windows(2)
            .map(|pair| (pair[1] - 1) * pair[0])
            .sum()
    }

    /// Runs the forward pass and returns the output layer's non-bias values.
    ///
    /// The full activation cache (all intermediate layers) persists after
    /// return; [`Perceptron::back_propagate`] reads it, so a training step
    /// is always a `compute` followed by a `back_propagate` on the same
    /// instance.
    pub fn compute(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let expected = self.input_size();
        if inputs.len() != expected {
            return Err(NetworkError::LengthMismatch { expected, got: inputs.len() });
        }

        self.outputs[0][1..].copy_from_slice(inputs);

        for layer in 1..self.layer_sizes.len() {
            for dst in 1..self.layer_sizes[layer] {
                let mut sum = 0.0;
                for src in 0..self.layer_sizes[layer - 1] {
                    sum += self.weights[layer - 1][src][dst] * self.outputs[layer - 1][src];
                }
                self.outputs[layer][dst] = sigmoid(sum);
            }
        }

        Ok(self.outputs[self.layer_sizes.len() - 1][1..].to_vec())
    }

    /// Overwrites all weights from a flat vector.
    ///
    /// Ordering contract: layer ascending, destination neuron ascending
    /// with the bias slot skipped, source neuron ascending. The momentum
    /// store is left untouched — overwriting weights by hand does not
    /// reset inertia. Fails with `ShapeMismatch` before touching anything
    /// when the length is off.
    pub fn set_weights(&mut self, flat: &[f64]) -> Result<(), NetworkError> {
        let expected = self.weight_count();
        if flat.len() != expected {
            return Err(NetworkError::ShapeMismatch { expected, got: flat.len() });
        }

        let mut index = 0;
        for layer in 0..self.layer_sizes.len() - 1 {
            for dst in 1..self.layer_sizes[layer + 1] {
                for src in 0..self.layer_sizes[layer] {
                    self.weights[layer][src][dst] = flat[index];
                    index += 1;
                }
            }
        }
        Ok(())
    }

    /// Exports all weights as a flat vector, the exact inverse of
    /// [`Perceptron::set_weights`].
    pub fn get_weights(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.weight_count());
        for layer in 0..self.layer_sizes.len() - 1 {
            for dst in 1..self.layer_sizes[layer + 1] {
                for src in 0..self.layer_sizes[layer] {
                    flat.push(self.weights[layer][src][dst]);
                }
            }
        }
        flat
    }

    /// Assigns every weight independently from a uniform distribution
    /// over [min, max].
    pub fn randomize_weights(&mut self, min: f64, max: f64) -> Result<(), NetworkError> {
        if min > max {
            return Err(NetworkError::InvalidRange { min, max });
        }

        let mut rng = rand::thread_rng();
        let span = max - min;
        for layer in 0..self.layer_sizes.len() - 1 {
            for dst in 1..self.layer_sizes[layer + 1] {
                for src in 0..self.layer_sizes[layer] {
                    self.weights[layer][src][dst] = rng.gen::<f64>() * span + min;
                }
            }
        }
        Ok(())
    }

    /// Enables clamping of every future weight update into [min, max]
    /// inclusive. Existing weights are not clamped retroactively.
    pub fn set_weight_bounds(&mut self, min: f64, max: f64) -> Result<(), NetworkError> {
        if min > max {
            return Err(NetworkError::InvalidRange { min, max });
        }
        self.bounds = Some((min, max));
        Ok(())
    }

    /// Serializes the network (topology, weights, caches, bounds) to a
    /// pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by
    /// [`Perceptron::save_json`].
    pub fn load_json(path: &str) -> std::io::Result<Perceptron> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Allocates a zeroed weight-shaped store: one matrix per layer
/// transition, sized (source layer) × (destination layer).
fn alloc_store(layer_sizes: &[usize]) -> Vec<Vec<Vec<f64>>> {
    layer_sizes.windows(2)
        .map(|pair| vec![vec![0.0; pair[1]]; pair[0]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_reserves_bias_slots() {
        let net = Perceptron::new(&[3, 5, 2]);
        assert_eq!(net.layer_sizes, vec![4, 6, 3]);
        for layer in net.activations() {
            assert_eq!(layer[0], 1.0);
        }
        assert_eq!(net.input_size(), 3);
        assert_eq!(net.output_size(), 2);
        assert_eq!(net.topology(), vec![3, 5, 2]);
    }

    #[test]
    fn weight_count_matches_formula() {
        // Σ l_i * (l_{i-1} + 1) over the caller-given sizes.
        let net = Perceptron::new(&[3, 5, 3]);
        assert_eq!(net.weight_count(), 5 * (3 + 1) + 3 * (5 + 1));

        let net = Perceptron::new(&[1, 4, 1]);
        assert_eq!(net.weight_count(), 4 * 2 + 1 * 5);
    }

    #[test]
    #[should_panic(expected = "at least")]
    fn construction_rejects_single_layer() {
        Perceptron::new(&[3]);
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn construction_rejects_zero_sized_layer() {
        Perceptron::new(&[3, 0, 2]);
    }

    #[test]
    fn weights_round_trip_exactly() {
        let mut net = Perceptron::new(&[2, 3, 1]);
        let flat: Vec<f64> = (0..net.weight_count()).map(|i| i as f64 * 0.125 - 0.5).collect();
        net.set_weights(&flat).unwrap();
        assert_eq!(net.get_weights(), flat);
    }

    #[test]
    fn set_weights_rejects_wrong_length_without_mutation() {
        let mut net = Perceptron::new(&[3, 5, 3]);
        let count = net.weight_count();
        let before = net.get_weights();

        for bad_len in [count - 1, count + 1] {
            let err = net.set_weights(&vec![1.0; bad_len]).unwrap_err();
            assert_eq!(err, NetworkError::ShapeMismatch { expected: count, got: bad_len });
            assert_eq!(net.get_weights(), before);
        }
    }

    #[test]
    fn randomize_rejects_inverted_range_without_mutation() {
        let mut net = Perceptron::new(&[2, 2]);
        let before = net.get_weights();

        let err = net.randomize_weights(1.0, -1.0).unwrap_err();
        assert_eq!(err, NetworkError::InvalidRange { min: 1.0, max: -1.0 });
        assert_eq!(net.get_weights(), before);
    }

    #[test]
    fn randomize_stays_within_range() {
        let mut net = Perceptron::new(&[4, 6, 4]);
        net.randomize_weights(-0.25, 0.25).unwrap();
        assert!(net.get_weights().iter().all(|w| (-0.25..=0.25).contains(w)));
    }

    #[test]
    fn weight_bounds_reject_inverted_range() {
        let mut net = Perceptron::new(&[2, 2]);
        let err = net.set_weight_bounds(1.0, -1.0).unwrap_err();
        assert_eq!(err, NetworkError::InvalidRange { min: 1.0, max: -1.0 });
        assert!(net.bounds.is_none());
    }

    #[test]
    fn compute_rejects_wrong_input_length() {
        let mut net = Perceptron::new(&[2, 3, 1]);
        let err = net.compute(&[0.5]).unwrap_err();
        assert_eq!(err, NetworkError::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn compute_is_deterministic() {
        let mut net = Perceptron::new(&[2, 3, 2]);
        net.randomize_weights(-1.0, 1.0).unwrap();

        let first = net.compute(&[0.3, 0.7]).unwrap();
        let second = net.compute(&[0.3, 0.7]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn compute_with_zero_weights_yields_half() {
        // All weighted sums are 0, and sigmoid(0) = 0.5.
        let mut net = Perceptron::new(&[2, 2, 2]);
        let outputs = net.compute(&[0.1, 0.9]).unwrap();
        assert_eq!(outputs, vec![0.5, 0.5]);
    }

    #[test]
    fn bias_slots_survive_compute() {
        let mut net = Perceptron::new(&[2, 4, 1]);
        net.randomize_weights(-1.0, 1.0).unwrap();
        net.compute(&[0.2, 0.8]).unwrap();

        for layer in net.activations() {
            assert_eq!(layer[0], 1.0);
        }
    }

    #[test]
    fn compute_output_length_matches_output_layer() {
        let mut net = Perceptron::new(&[3, 5, 2]);
        let outputs = net.compute(&[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(outputs.len(), 2);
    }
}
