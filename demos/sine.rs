use std::f64::consts::PI;

use lamina_nn::{MomentumSgd, Perceptron, train_network};

/// Approximates one period of a sine wave, normalized into [0, 1] on
/// both axes: x in [0, 1], y = (sin(2πx) + 1) / 2.
fn main() {
    let (inputs, targets) = sine_table(21);

    let mut network = Perceptron::new(&[1, 4, 1]);
    network.randomize_weights(-1.0, 1.0).expect("valid range");

    let optimizer = MomentumSgd::default();
    let epochs = 2000;

    for epoch in 0..epochs {
        let error = train_network(&mut network, &inputs, &targets, &optimizer)
            .expect("dataset matches topology");
        if epoch % 200 == 0 {
            println!("Epoch {epoch}: error = {error:.6}");
        }
    }

    println!("\n    x     target  output");
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let output = network.compute(input).expect("dataset matches topology");
        println!("{:.3}   {:.4}  {:.4}", input[0], target[0], output[0]);
    }
}

fn sine_table(samples: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut inputs = Vec::with_capacity(samples);
    let mut targets = Vec::with_capacity(samples);
    for i in 0..samples {
        let x = i as f64 / (samples - 1) as f64;
        inputs.push(vec![x]);
        targets.push(vec![((2.0 * PI * x).sin() + 1.0) / 2.0]);
    }
    (inputs, targets)
}
