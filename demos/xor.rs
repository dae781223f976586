use lamina_nn::{MomentumSgd, Perceptron, train_network};

fn main() {
    let mut network = Perceptron::new(&[2, 3, 1]);
    network.randomize_weights(-1.0, 1.0).expect("valid range");

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let targets = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let optimizer = MomentumSgd::new(0.5, 0.9);
    let epochs = 5000;

    for epoch in 0..epochs {
        let error = train_network(&mut network, &inputs, &targets, &optimizer)
            .expect("dataset matches topology");
        if epoch % 500 == 0 {
            println!("Epoch {epoch}: error = {error:.6}");
        }
    }

    for input in &inputs {
        let output = network.compute(input).expect("dataset matches topology");
        println!("Input: {:?} -> Output: {:.4}", input, output[0]);
    }
}
