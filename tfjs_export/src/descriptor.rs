use serde::Serialize;

/// Metadata for one tensor inside the packed weight blob.
///
/// The ordered list of descriptors *is* the offset table: a tensor starts
/// where the byte lengths of all prior descriptors end. The blob itself
/// carries no header, so this record is the only place shape and dtype
/// are written down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightDescriptor {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: &'static str,
}

impl WeightDescriptor {
    pub fn float32(name: String, shape: Vec<usize>) -> Self {
        Self {
            name,
            shape,
            dtype: "float32",
        }
    }

    /// Number of scalar elements described.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// Byte length of the described tensor inside the blob.
    pub fn byte_len(&self) -> usize {
        4 * self.num_elements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_is_four_times_element_count() {
        let d = WeightDescriptor::float32("dense_1/kernel".into(), vec![784, 256]);
        assert_eq!(d.num_elements(), 784 * 256);
        assert_eq!(d.byte_len(), 4 * 784 * 256);
        assert_eq!(d.dtype, "float32");
    }

    #[test]
    fn scalar_free_shape_of_bias() {
        let d = WeightDescriptor::float32("dense_1/bias".into(), vec![256]);
        assert_eq!(d.byte_len(), 1024);
    }
}
