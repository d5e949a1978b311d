//! Translation of trained network parameters into a TensorFlow.js
//! layers-model bundle (`model.json` + `weights.bin` + `labels.json`).
//!
//! The translation is a silent-failure-prone binary contract: a wrong
//! axis permutation or offset still loads in the browser and predicts
//! garbage. Everything here is therefore kept as small pure functions
//! with the shape bookkeeping made explicit.

pub mod descriptor;
pub mod error;
pub mod spec;
pub mod topology;
pub mod translate;
pub mod writer;

pub use descriptor::WeightDescriptor;
pub use error::{ExportErr, Result};
pub use spec::{Activation, LayerConfig, LayerParams, LayerSpec, Padding, TrainedLayer};
pub use topology::model_json;
pub use translate::translate;
pub use writer::{Label, write_bundle};
