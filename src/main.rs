// This binary crate is intentionally minimal.
// All perceptron logic lives in the library (src/lib.rs and its modules).
// Run examples with:
//   cargo run --example sine
fn main() {
    println!("lamina-nn: a minimal multilayer perceptron in Rust.");
    println!("Run `cargo run --example xor` or `cargo run --example sine` to see it learn.");
}
