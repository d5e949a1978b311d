//! End-to-end checks of the binary-plus-manifest contract: descriptor
//! ordering, blob offsets, and reconstruction of the packed tensors
//! using nothing but the descriptor list.

use ndarray::{Array1, Array2, Array4};
use serde_json::json;
use tfjs_export::{
    Activation, LayerConfig, LayerSpec, TrainedLayer, WeightDescriptor, model_json, translate,
};

fn sequential(n: usize) -> Vec<f32> {
    (0..n).map(|v| v as f32 * 0.5 - 3.0).collect()
}

#[test]
fn two_dense_layer_scenario() {
    let layers = vec![
        TrainedLayer::dense(
            "dense_1",
            Array2::from_shape_vec((256, 784), sequential(256 * 784)).unwrap(),
            Array1::from_vec(sequential(256)),
        ),
        TrainedLayer::dense(
            "dense_2",
            Array2::from_shape_vec((33, 256), sequential(33 * 256)).unwrap(),
            Array1::from_vec(sequential(33)),
        ),
    ];

    let (blob, descriptors) = translate(&layers);

    let expected: Vec<(&str, Vec<usize>)> = vec![
        ("dense_1/kernel", vec![784, 256]),
        ("dense_1/bias", vec![256]),
        ("dense_2/kernel", vec![256, 33]),
        ("dense_2/bias", vec![33]),
    ];
    assert_eq!(descriptors.len(), expected.len());
    for (descriptor, (name, shape)) in descriptors.iter().zip(&expected) {
        assert_eq!(&descriptor.name, name);
        assert_eq!(&descriptor.shape, shape);
        assert_eq!(descriptor.dtype, "float32");
    }

    assert_eq!(blob.len(), 4 * (784 * 256 + 256 + 256 * 33 + 33));
}

/// Rebuilds every tensor from the blob using only the descriptor list and
/// cumulative offsets, and checks byte equality against a re-translation.
#[test]
fn descriptors_reconstruct_the_blob_exactly() {
    let conv_kernel =
        Array4::from_shape_vec((2, 1, 3, 3), sequential(18)).unwrap();
    let layers = vec![
        TrainedLayer::conv("conv2d_1", conv_kernel.clone(), Array1::from_vec(sequential(2))),
        TrainedLayer::dense(
            "dense_1",
            Array2::from_shape_vec((4, 18), sequential(72)).unwrap(),
            Array1::from_vec(sequential(4)),
        ),
    ];

    let (blob, descriptors) = translate(&layers);

    let mut offset = 0usize;
    let mut slices: Vec<(&WeightDescriptor, &[u8])> = Vec::new();
    for descriptor in &descriptors {
        let end = offset + descriptor.byte_len();
        slices.push((descriptor, &blob[offset..end]));
        offset = end;
    }
    assert_eq!(offset, blob.len(), "descriptors must tile the whole blob");

    // The permuted conv kernel re-serialized on its own must equal the
    // slice the descriptor points at, byte for byte.
    let permuted = tfjs_export::translate::permute_conv_kernel(conv_kernel.view());
    let expected: Vec<u8> = permuted.iter().flat_map(|v| v.to_le_bytes()).collect();
    let (descriptor, bytes) = slices[0];
    assert_eq!(descriptor.name, "conv2d_1/kernel");
    assert_eq!(descriptor.shape, vec![3, 3, 1, 2]);
    assert_eq!(bytes, expected.as_slice());
}

#[test]
fn cnn_topology_matches_its_descriptors() {
    let specs = vec![
        LayerSpec::new(
            "conv2d_1",
            LayerConfig::Conv2d {
                filters: 32,
                kernel_size: (3, 3),
                strides: (1, 1),
                padding: tfjs_export::Padding::Same,
                activation: Activation::Relu,
                input_shape: Some([28, 28, 1]),
            },
        ),
        LayerSpec::new(
            "max_pooling2d_1",
            LayerConfig::MaxPool2d { pool_size: (2, 2), strides: (2, 2) },
        ),
        LayerSpec::new(
            "flatten_1",
            LayerConfig::Flatten,
        ),
        LayerSpec::new(
            "dense_1",
            LayerConfig::Dense { units: 33, activation: Activation::Softmax, input_dim: None },
        ),
    ];

    let layers = vec![
        TrainedLayer::conv(
            "conv2d_1",
            Array4::zeros((32, 1, 3, 3)),
            Array1::zeros(32),
        ),
        TrainedLayer::dense(
            "dense_1",
            Array2::zeros((33, 6272)),
            Array1::zeros(33),
        ),
    ];

    let (blob, descriptors) = translate(&layers);
    let doc = model_json(&specs, &descriptors, "train_cnn");

    let names: Vec<&str> = doc["modelTopology"]["config"]["layers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["config"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["conv2d_1", "max_pooling2d_1", "flatten_1", "dense_1"]);

    assert_eq!(doc["weightsManifest"][0]["paths"], json!(["weights.bin"]));
    let manifest_weights = doc["weightsManifest"][0]["weights"].as_array().unwrap();
    assert_eq!(manifest_weights.len(), descriptors.len());

    let manifest_total: usize = manifest_weights
        .iter()
        .map(|w| {
            4 * w["shape"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_u64().unwrap() as usize)
                .product::<usize>()
        })
        .sum();
    assert_eq!(manifest_total, blob.len());
}
