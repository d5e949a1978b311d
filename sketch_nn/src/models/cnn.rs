use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tfjs_export::{Activation, LayerConfig, LayerSpec, Padding, TrainedLayer};

use crate::activations::ActFn;
use crate::layers::{Conv2d, Dense, Dropout, MaxPool2d};
use crate::network::Network;

const IMG: usize = 28;

/// The convolutional sketch classifier.
///
/// Two conv/pool blocks over `[batch, 1, 28, 28]` input, then a dense
/// head with dropout. The last dense layer emits raw logits; the
/// exported topology declares softmax on it and the loss applies the
/// softmax itself during training.
pub struct ConvNet {
    conv1: Conv2d,
    pool1: MaxPool2d,
    conv2: Conv2d,
    pool2: MaxPool2d,
    fc1: Dense,
    dropout: Dropout,
    fc2: Dense,

    num_classes: usize,
    // Pool output shape recorded in forward, reused to fold the dense
    // delta back into feature maps.
    feat_dim: (usize, usize, usize, usize),
}

impl ConvNet {
    pub fn new(num_classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let conv1 = Conv2d::new(1, 32, (3, 3), ActFn::Relu, &mut rng);
        let conv2 = Conv2d::new(32, 64, (3, 3), ActFn::Relu, &mut rng);
        // 28 -> 14 -> 7 after the two pools.
        let flat = 64 * (IMG / 4) * (IMG / 4);
        let fc1 = Dense::new(flat, 128, Some(ActFn::Relu), &mut rng);
        let fc2 = Dense::new(128, num_classes, None, &mut rng);

        Self {
            conv1,
            pool1: MaxPool2d::new(),
            conv2,
            pool2: MaxPool2d::new(),
            fc1,
            dropout: Dropout::new(0.4, rng.random()),
            fc2,
            num_classes,
            feat_dim: (0, 0, 0, 0),
        }
    }
}

impl Network for ConvNet {
    fn forward(&mut self, x: ArrayView2<f32>, train: bool) -> Array2<f32> {
        let batch = x.nrows();
        assert_eq!(x.ncols(), IMG * IMG, "expected flattened 28x28 rows");

        let imgs = x
            .to_owned()
            .into_shape_with_order((batch, 1, IMG, IMG))
            .unwrap();

        let a1 = self.conv1.forward(&imgs);
        let p1 = self.pool1.forward(&a1);
        let a2 = self.conv2.forward(&p1);
        let p2 = self.pool2.forward(&a2);

        self.feat_dim = p2.dim();
        let (b, c, h, w) = self.feat_dim;
        let flat = p2.into_shape_with_order((b, c * h * w)).unwrap();

        let h1 = self.fc1.forward(flat.view());
        let h1 = self.dropout.forward(h1, train);
        self.fc2.forward(h1.view())
    }

    fn backward(&mut self, delta: Array2<f32>) {
        let d = self.fc2.backward(delta);
        let d = self.dropout.backward(d);
        let d = self.fc1.backward(d);

        let d = d.into_shape_with_order(self.feat_dim).unwrap();
        let d = self.pool2.backward(&d);
        let d = self.conv2.backward(d);
        let d = self.pool1.backward(&d);
        let _ = self.conv1.backward(d);
    }

    fn param_grads(&mut self) -> Vec<(&mut [f32], &[f32])> {
        let mut pairs = Vec::with_capacity(8);
        pairs.extend(self.conv1.param_grads());
        pairs.extend(self.conv2.param_grads());
        pairs.extend(self.fc1.param_grads());
        pairs.extend(self.fc2.param_grads());
        pairs
    }

    fn layer_specs(&self) -> Vec<LayerSpec> {
        vec![
            LayerSpec::new(
                "conv2d_1",
                LayerConfig::Conv2d {
                    filters: self.conv1.out_channels(),
                    kernel_size: self.conv1.kernel(),
                    strides: (1, 1),
                    padding: Padding::Same,
                    activation: Activation::Relu,
                    input_shape: Some([IMG, IMG, 1]),
                },
            ),
            LayerSpec::new(
                "max_pooling2d_1",
                LayerConfig::MaxPool2d {
                    pool_size: (2, 2),
                    strides: (2, 2),
                },
            ),
            LayerSpec::new(
                "conv2d_2",
                LayerConfig::Conv2d {
                    filters: self.conv2.out_channels(),
                    kernel_size: self.conv2.kernel(),
                    strides: (1, 1),
                    padding: Padding::Same,
                    activation: Activation::Relu,
                    input_shape: None,
                },
            ),
            LayerSpec::new(
                "max_pooling2d_2",
                LayerConfig::MaxPool2d {
                    pool_size: (2, 2),
                    strides: (2, 2),
                },
            ),
            LayerSpec::new("flatten_1", LayerConfig::Flatten),
            LayerSpec::new(
                "dense_1",
                LayerConfig::Dense {
                    units: self.fc1.out_features(),
                    activation: Activation::Relu,
                    input_dim: None,
                },
            ),
            LayerSpec::new(
                "dense_2",
                LayerConfig::Dense {
                    units: self.num_classes,
                    activation: Activation::Softmax,
                    input_dim: None,
                },
            ),
        ]
    }

    fn trained_layers(&self) -> Vec<TrainedLayer> {
        vec![
            TrainedLayer::conv("conv2d_1", self.conv1.weights().clone(), self.conv1.bias().clone()),
            TrainedLayer::conv("conv2d_2", self.conv2.weights().clone(), self.conv2.bias().clone()),
            TrainedLayer::dense("dense_1", self.fc1.weights().clone(), self.fc1.bias().clone()),
            TrainedLayer::dense("dense_2", self.fc2.weights().clone(), self.fc2.bias().clone()),
        ]
    }
}
