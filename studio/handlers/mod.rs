pub mod setup;
pub mod train;
pub mod train_sse;
pub mod test;
pub mod models;
