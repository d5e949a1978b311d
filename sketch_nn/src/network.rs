use ndarray::{Array2, ArrayView2};
use tfjs_export::{LayerSpec, TrainedLayer};

/// A trainable classifier over flattened `[batch, 784]` pixel rows.
///
/// Implementations own their layers and caches; `forward` followed by
/// `backward` leaves fresh gradients behind each parameter, ready for
/// an optimizer step through `param_grads`.
pub trait Network {
    /// Produces raw logits `[batch, classes]`. `train` enables
    /// train-only behaviour such as dropout.
    fn forward(&mut self, x: ArrayView2<f32>, train: bool) -> Array2<f32>;

    /// Propagates the loss delta over the logits back through every
    /// layer, accumulating parameter gradients.
    fn backward(&mut self, delta: Array2<f32>);

    /// Parameter/gradient slice pairs in a fixed order, kernel before
    /// bias within each layer.
    fn param_grads(&mut self) -> Vec<(&mut [f32], &[f32])>;

    /// The architecture as the exporter sees it, in forward order.
    fn layer_specs(&self) -> Vec<LayerSpec>;

    /// The trained parameters of every weight-bearing layer, in the
    /// same order as `layer_specs` lists them.
    fn trained_layers(&self) -> Vec<TrainedLayer>;

    /// Copies every parameter tensor out, in `param_grads` order.
    fn snapshot(&mut self) -> Vec<Vec<f32>> {
        self.param_grads()
            .into_iter()
            .map(|(p, _)| p.to_vec())
            .collect()
    }

    /// Writes a `snapshot` back into the parameters.
    fn restore(&mut self, snapshot: &[Vec<f32>]) {
        let mut params = self.param_grads();
        assert_eq!(params.len(), snapshot.len(), "snapshot from another network");
        for ((param, _), saved) in params.iter_mut().zip(snapshot) {
            param.copy_from_slice(saved);
        }
    }
}
