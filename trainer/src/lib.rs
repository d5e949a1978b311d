//! End-to-end training pipelines for the sketch classifiers: load the
//! per-category sample files, train a model, and export it as a
//! TensorFlow.js layers-model bundle.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::TrainConfig;
pub use error::{Result, TrainErr};
pub use pipeline::{run_cnn, run_mlp};
