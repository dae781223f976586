pub mod activation;
pub mod error;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::sigmoid;
pub use error::NetworkError;
pub use loss::sse::SseLoss;
pub use network::perceptron::Perceptron;
pub use optim::momentum::MomentumSgd;
pub use train::epoch_stats::EpochStats;
pub use train::loop_fn::train_loop;
pub use train::train_config::TrainConfig;
pub use train::trainer::train_network;
