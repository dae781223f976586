use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lamina_nn::Perceptron;

fn bench_compute(c: &mut Criterion) {
    let mut network = Perceptron::new(&[3, 5, 5, 3]);
    network.randomize_weights(-1.0, 1.0).unwrap();
    let input = [0.5, 0.5, 0.5];

    c.bench_function("compute 3-5-5-3", |b| {
        b.iter(|| network.compute(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, bench_compute);
criterion_main!(benches);
