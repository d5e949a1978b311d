mod cnn;
mod mlp;

pub use cnn::ConvNet;
pub use mlp::Mlp;
