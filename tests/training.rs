use std::f64::consts::PI;
use std::sync::mpsc;

use lamina_nn::{EpochStats, MomentumSgd, Perceptron, TrainConfig, train_loop};

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

#[test]
fn single_step_moves_downhill() {
    let mut network = Perceptron::new(&[2, 3, 1]);
    let flat: Vec<f64> = (0..network.weight_count())
        .map(|i| (i % 9) as f64 / 9.0 - 0.4)
        .collect();
    network.set_weights(&flat).unwrap();

    let inputs = [0.25, 0.75];
    let targets = [0.9];

    let (_, before) = network.compute_error(&inputs, &targets).unwrap();
    assert!(before > 0.0);

    network.back_propagate(&targets, &MomentumSgd::default()).unwrap();

    let (_, after) = network.compute_error(&inputs, &targets).unwrap();
    assert!(after < before, "error went from {before} to {after}");
}

#[test]
fn sine_training_converges() {
    let (inputs, targets) = sine_table(21);

    let mut network = Perceptron::new(&[1, 4, 1]);
    network.randomize_weights(-1.0, 1.0).unwrap();

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(600);
    config.shuffle = false;
    config.progress_tx = Some(tx);

    train_loop(
        &mut network,
        &inputs,
        &targets,
        None,
        None,
        &MomentumSgd::default(),
        &config,
    )
    .unwrap();

    let history: Vec<EpochStats> = rx.try_iter().collect();
    assert_eq!(history.len(), 600);

    // Momentum allows local upticks, so compare window means instead of
    // demanding strict monotonicity.
    let early: f64 = history[..20].iter().map(|s| s.train_error).sum::<f64>() / 20.0;
    let late: f64 = history[580..].iter().map(|s| s.train_error).sum::<f64>() / 20.0;
    assert!(
        late < early,
        "mean error over the last epochs ({late}) should undercut the first ({early})"
    );
}

#[test]
fn bias_outputs_stay_pinned_through_training() {
    let (inputs, targets) = sine_table(11);

    let mut network = Perceptron::new(&[1, 3, 1]);
    network.randomize_weights(-1.0, 1.0).unwrap();

    let config = TrainConfig::new(50);
    train_loop(
        &mut network,
        &inputs,
        &targets,
        None,
        None,
        &MomentumSgd::default(),
        &config,
    )
    .unwrap();

    for layer in network.activations() {
        assert_eq!(layer[0], 1.0);
    }
}

#[test]
fn bounded_weights_never_escape() {
    let (inputs, targets) = sine_table(11);

    let mut network = Perceptron::new(&[1, 4, 1]);
    network.randomize_weights(-0.5, 0.5).unwrap();
    network.set_weight_bounds(-0.5, 0.5).unwrap();

    // A deliberately oversized learning rate tries to push weights out.
    let optimizer = MomentumSgd::new(2.0, 0.5);
    let config = TrainConfig::new(100);

    train_loop(&mut network, &inputs, &targets, None, None, &optimizer, &config).unwrap();

    assert!(
        network.get_weights().iter().all(|w| (-0.5..=0.5).contains(w)),
        "a weight escaped the configured bounds"
    );
}

#[test]
fn flat_weights_survive_save_and_load() {
    let mut network = Perceptron::new(&[2, 3, 2]);
    network.randomize_weights(-1.0, 1.0).unwrap();
    let weights = network.get_weights();

    let path = std::env::temp_dir().join("lamina-nn-roundtrip.json");
    let path = path.to_str().unwrap();
    network.save_json(path).unwrap();

    let restored = Perceptron::load_json(path).unwrap();
    assert_eq!(restored.topology(), vec![2, 3, 2]);
    assert_eq!(restored.get_weights(), weights);

    let _ = std::fs::remove_file(path);
}
