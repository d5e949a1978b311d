use ndarray::{Array1, Array2, Array4};

/// Activation function declared on a layer of the exported topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Softmax,
}

impl Activation {
    pub fn as_str(self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::Softmax => "softmax",
        }
    }
}

/// Spatial padding mode of a convolution or pooling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Same,
    Valid,
}

impl Padding {
    pub fn as_str(self) -> &'static str {
        match self {
            Padding::Same => "same",
            Padding::Valid => "valid",
        }
    }
}

/// One layer of the architecture as the inference runtime will see it.
///
/// The `name` is the join key of the whole export: it prefixes the weight
/// descriptor names (`<name>/kernel`, `<name>/bias`) and appears verbatim
/// in the topology document. Threading it through a single typed value
/// keeps the three outputs from drifting apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub name: String,
    pub config: LayerConfig,
}

/// Per-layer hyperparameters mirrored into the topology document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerConfig {
    Conv2d {
        filters: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
        activation: Activation,
        /// `(height, width, channels)`, set on the first layer only.
        input_shape: Option<[usize; 3]>,
    },
    MaxPool2d {
        pool_size: (usize, usize),
        strides: (usize, usize),
    },
    Flatten,
    Dense {
        units: usize,
        activation: Activation,
        /// Flat input width, set on the first layer only.
        input_dim: Option<usize>,
    },
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, config: LayerConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Whether this layer carries a kernel and bias in the weight blob.
    pub fn has_weights(&self) -> bool {
        matches!(
            self.config,
            LayerConfig::Conv2d { .. } | LayerConfig::Dense { .. }
        )
    }
}

/// The trained parameters of one weight-bearing layer, in the source
/// framework's axis conventions.
///
/// Conv kernels are `[out, in, kh, kw]`, dense kernels `[out, in]`,
/// biases `[out]`. The strong typing here is deliberate: a conv layer
/// cannot be handed a rank-2 kernel, so the translator has no
/// recoverable error paths left.
#[derive(Debug, Clone)]
pub struct TrainedLayer {
    pub name: String,
    pub params: LayerParams,
}

#[derive(Debug, Clone)]
pub enum LayerParams {
    Conv {
        kernel: Array4<f32>,
        bias: Array1<f32>,
    },
    Dense {
        kernel: Array2<f32>,
        bias: Array1<f32>,
    },
}

impl TrainedLayer {
    pub fn conv(name: impl Into<String>, kernel: Array4<f32>, bias: Array1<f32>) -> Self {
        assert_eq!(kernel.shape()[0], bias.len(), "conv bias must match out channels");
        Self {
            name: name.into(),
            params: LayerParams::Conv { kernel, bias },
        }
    }

    pub fn dense(name: impl Into<String>, kernel: Array2<f32>, bias: Array1<f32>) -> Self {
        assert_eq!(kernel.nrows(), bias.len(), "dense bias must match out features");
        Self {
            name: name.into(),
            params: LayerParams::Dense { kernel, bias },
        }
    }
}
