use crate::error::NetworkError;
use crate::network::perceptron::Perceptron;
use crate::optim::MomentumSgd;

/// Runs one full pass over the samples — one forward/backward training
/// step per (input, target) pair, in the given order — and returns the
/// mean error over the pass.
pub fn train_network(
    network: &mut Perceptron,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    optimizer: &MomentumSgd,
) -> Result<f64, NetworkError> {
    let mut total_error = 0.0;

    for (input, target) in inputs.iter().zip(targets.iter()) {
        let (_, error) = network.compute_error(input, target)?;
        total_error += error;
        network.back_propagate(target, optimizer)?;
    }

    Ok(total_error / inputs.len() as f64)
}
