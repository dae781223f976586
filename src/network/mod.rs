pub mod perceptron;
mod training;

pub use perceptron::Perceptron;
