//! A small CPU neural-network core for the sketch classifiers: dense and
//! convolution layers with explicit backward passes, softmax
//! cross-entropy loss, Adam, and a minibatch training loop.
//!
//! Parameters keep the source axis conventions the exporter expects:
//! conv kernels `[out, in, kh, kw]`, dense kernels `[out, in]`.

pub mod activations;
pub mod layers;
pub mod loss;
pub mod models;
pub mod network;
pub mod optim;
pub mod training;

pub use activations::ActFn;
pub use models::{ConvNet, Mlp};
pub use network::Network;
pub use optim::{Adam, Optimizer};
pub use training::{FitConfig, FitReport, Plateau, evaluate, fit};
