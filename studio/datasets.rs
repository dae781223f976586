use std::f64::consts::PI;

use crate::state::DatasetState;

/// Expands a named built-in dataset, or `None` for an unknown name.
///
/// The trig tables sample one full period with both axes normalized
/// into [0, 1]: x = i/20, y = (f(2πx) + 1) / 2, 21 points.
pub fn builtin(name: &str) -> Option<DatasetState> {
    let (inputs, targets) = match name {
        "sine" => function_table(|x| ((2.0 * PI * x).sin() + 1.0) / 2.0),
        "cosine" => function_table(|x| ((2.0 * PI * x).cos() + 1.0) / 2.0),
        "xor" => xor_table(),
        _ => return None,
    };

    let preview_rows = inputs.iter().cloned()
        .zip(targets.iter().cloned())
        .take(5)
        .collect();

    Some(DatasetState {
        inputs,
        targets,
        source_name: name.to_owned(),
        preview_rows,
    })
}

fn function_table(f: impl Fn(f64) -> f64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let samples = 21;
    let mut inputs = Vec::with_capacity(samples);
    let mut targets = Vec::with_capacity(samples);
    for i in 0..samples {
        let x = i as f64 / (samples - 1) as f64;
        inputs.push(vec![x]);
        targets.push(vec![f(x)]);
    }
    (inputs, targets)
}

fn xor_table() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    (inputs, targets)
}

/// Number of input / target columns a dataset expects, used to validate
/// the plan's first and last layer against the selected dataset.
pub fn expected_shape(name: &str) -> Option<(usize, usize)> {
    match name {
        "sine" | "cosine" => Some((1, 1)),
        "xor" => Some((2, 1)),
        _ => None,
    }
}
