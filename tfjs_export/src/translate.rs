use ndarray::{Array2, Array4, ArrayView2, ArrayView4};

use crate::descriptor::WeightDescriptor;
use crate::spec::{LayerParams, TrainedLayer};

/// Reorders a convolution kernel from the source convention
/// `[out, in, kh, kw]` to the runtime convention `[kh, kw, in, out]`.
///
/// This moves values, it does not reinterpret them: the returned array is
/// in standard (row-major) layout so its flat iteration order is the
/// order the bytes go into the blob.
pub fn permute_conv_kernel(kernel: ArrayView4<f32>) -> Array4<f32> {
    kernel.permuted_axes([2, 3, 1, 0]).as_standard_layout().into_owned()
}

/// Transposes a dense kernel from `[out, in]` to `[in, out]`.
pub fn transpose_dense_kernel(kernel: ArrayView2<f32>) -> Array2<f32> {
    kernel.t().as_standard_layout().into_owned()
}

/// Packs the trained layers, in order, into a flat little-endian f32 blob
/// and the matching ordered descriptor list.
///
/// For every layer the kernel goes first (permuted or transposed into the
/// runtime convention), then the bias verbatim. The concatenation order of
/// the blob equals the descriptor order exactly; the topology serializer
/// and the writer both depend on that.
pub fn translate(layers: &[TrainedLayer]) -> (Vec<u8>, Vec<WeightDescriptor>) {
    let mut blob = Vec::new();
    let mut descriptors = Vec::with_capacity(layers.len() * 2);

    for layer in layers {
        let (kernel_shape, bias) = match &layer.params {
            LayerParams::Conv { kernel, bias } => {
                let kernel = permute_conv_kernel(kernel.view());
                append_f32_le(&mut blob, kernel.iter().copied());
                (kernel.shape().to_vec(), bias)
            }
            LayerParams::Dense { kernel, bias } => {
                let kernel = transpose_dense_kernel(kernel.view());
                append_f32_le(&mut blob, kernel.iter().copied());
                (kernel.shape().to_vec(), bias)
            }
        };

        descriptors.push(WeightDescriptor::float32(
            format!("{}/kernel", layer.name),
            kernel_shape,
        ));

        append_f32_le(&mut blob, bias.iter().copied());
        descriptors.push(WeightDescriptor::float32(
            format!("{}/bias", layer.name),
            vec![bias.len()],
        ));
    }

    let expected: usize = descriptors.iter().map(WeightDescriptor::byte_len).sum();
    assert_eq!(
        blob.len(),
        expected,
        "weight blob length does not match the descriptor list"
    );

    (blob, descriptors)
}

fn append_f32_le(buf: &mut Vec<u8>, values: impl Iterator<Item = f32>) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}
