use serde_json::{Value, json};

use crate::descriptor::WeightDescriptor;
use crate::spec::{LayerConfig, LayerSpec};

/// Builds the complete `model.json` document for a sequential stack.
///
/// The layer list is emitted in the order of `specs`, and every
/// weight-bearing layer's `name` must prefix two entries of
/// `descriptors` (`<name>/kernel`, `<name>/bias`). That link is
/// asserted here because a mismatch would produce a bundle that loads
/// and predicts garbage.
pub fn model_json(specs: &[LayerSpec], descriptors: &[WeightDescriptor], generated_by: &str) -> Value {
    let weight_bearing = specs.iter().filter(|s| s.has_weights());
    let mut expected = descriptors.iter();
    for spec in weight_bearing {
        for suffix in ["kernel", "bias"] {
            let descriptor = expected
                .next()
                .unwrap_or_else(|| panic!("missing descriptor for layer '{}'", spec.name));
            assert_eq!(
                descriptor.name,
                format!("{}/{suffix}", spec.name),
                "descriptor order does not match layer order"
            );
        }
    }
    assert!(
        expected.next().is_none(),
        "descriptor list has entries with no matching layer"
    );

    let layers: Vec<Value> = specs.iter().map(layer_json).collect();

    json!({
        "modelTopology": {
            "class_name": "Sequential",
            "config": {
                "name": "sequential",
                "layers": layers,
            },
        },
        "weightsManifest": [
            {
                "paths": ["weights.bin"],
                "weights": descriptors,
            }
        ],
        "format": "layers-model",
        "generatedBy": generated_by,
        "convertedBy": null,
    })
}

fn layer_json(spec: &LayerSpec) -> Value {
    match &spec.config {
        LayerConfig::Conv2d {
            filters,
            kernel_size,
            strides,
            padding,
            activation,
            input_shape,
        } => {
            let mut config = json!({
                "filters": filters,
                "kernel_size": [kernel_size.0, kernel_size.1],
                "strides": [strides.0, strides.1],
                "padding": padding.as_str(),
                "data_format": "channels_last",
                "dilation_rate": [1, 1],
                "activation": activation.as_str(),
                "use_bias": true,
                "kernel_initializer": glorot_uniform(),
                "bias_initializer": zeros(),
                "name": spec.name,
                "dtype": "float32",
            });
            if let Some([h, w, c]) = input_shape {
                config["batch_input_shape"] = json!([null, h, w, c]);
            }
            json!({ "class_name": "Conv2D", "config": config })
        }
        LayerConfig::MaxPool2d { pool_size, strides } => json!({
            "class_name": "MaxPooling2D",
            "config": {
                "pool_size": [pool_size.0, pool_size.1],
                "strides": [strides.0, strides.1],
                "padding": "valid",
                "data_format": "channels_last",
                "name": spec.name,
            },
        }),
        LayerConfig::Flatten => json!({
            "class_name": "Flatten",
            "config": { "name": spec.name },
        }),
        LayerConfig::Dense {
            units,
            activation,
            input_dim,
        } => {
            let mut config = json!({
                "units": units,
                "activation": activation.as_str(),
                "use_bias": true,
                "kernel_initializer": glorot_uniform(),
                "bias_initializer": zeros(),
                "name": spec.name,
                "dtype": "float32",
            });
            if let Some(dim) = input_dim {
                config["batch_input_shape"] = json!([null, dim]);
            }
            json!({ "class_name": "Dense", "config": config })
        }
    }
}

fn glorot_uniform() -> Value {
    json!({ "class_name": "GlorotUniform", "config": { "seed": null } })
}

fn zeros() -> Value {
    json!({ "class_name": "Zeros", "config": {} })
}
