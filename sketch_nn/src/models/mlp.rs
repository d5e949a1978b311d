use ndarray::{Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};
use tfjs_export::{Activation, LayerConfig, LayerSpec, TrainedLayer};

use crate::activations::ActFn;
use crate::layers::Dense;
use crate::network::Network;

const INPUT: usize = 784;

/// The dense sketch classifier: 784 -> 256 -> 128 -> classes.
///
/// The lighter of the two models. Logits come out raw; softmax lives in
/// the loss during training and in the exported topology at inference.
pub struct Mlp {
    fc1: Dense,
    fc2: Dense,
    fc3: Dense,
    num_classes: usize,
}

impl Mlp {
    pub fn new(num_classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            fc1: Dense::new(INPUT, 256, Some(ActFn::Relu), &mut rng),
            fc2: Dense::new(256, 128, Some(ActFn::Relu), &mut rng),
            fc3: Dense::new(128, num_classes, None, &mut rng),
            num_classes,
        }
    }
}

impl Network for Mlp {
    fn forward(&mut self, x: ArrayView2<f32>, _train: bool) -> Array2<f32> {
        assert_eq!(x.ncols(), INPUT, "expected flattened 28x28 rows");
        let h = self.fc1.forward(x);
        let h = self.fc2.forward(h.view());
        self.fc3.forward(h.view())
    }

    fn backward(&mut self, delta: Array2<f32>) {
        let d = self.fc3.backward(delta);
        let d = self.fc2.backward(d);
        let _ = self.fc1.backward(d);
    }

    fn param_grads(&mut self) -> Vec<(&mut [f32], &[f32])> {
        let mut pairs = Vec::with_capacity(6);
        pairs.extend(self.fc1.param_grads());
        pairs.extend(self.fc2.param_grads());
        pairs.extend(self.fc3.param_grads());
        pairs
    }

    fn layer_specs(&self) -> Vec<LayerSpec> {
        vec![
            LayerSpec::new(
                "dense_1",
                LayerConfig::Dense {
                    units: self.fc1.out_features(),
                    activation: Activation::Relu,
                    input_dim: Some(INPUT),
                },
            ),
            LayerSpec::new(
                "dense_2",
                LayerConfig::Dense {
                    units: self.fc2.out_features(),
                    activation: Activation::Relu,
                    input_dim: None,
                },
            ),
            LayerSpec::new(
                "dense_3",
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
            TrainedLayer::dense("dense_1", self.fc1.weights().clone(), self.fc1.bias().clone()),
            TrainedLayer::dense("dense_2", self.fc2.weights().clone(), self.fc2.bias().clone()),
            TrainedLayer::dense("dense_3", self.fc3.weights().clone(), self.fc3.bias().clone()),
        ]
    }
}
