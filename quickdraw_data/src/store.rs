use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use ndarray::Array2;

use crate::categories::{Category, IMG_PIXELS, IMG_SIZE};
use crate::error::{DataErr, Result};
use crate::npy;

/// Read-only adapter over the on-disk per-category sample files.
#[derive(Debug, Clone)]
pub struct SampleStore {
    data_dir: PathBuf,
}

impl SampleStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Loads at most `cap` samples for `category`, preserving on-disk
    /// order. Rows are flattened 784-pixel bitmaps.
    ///
    /// # Errors
    /// `MissingCategoryFile` naming the expected path when the file is
    /// absent; `Npy` when it is not a C-ordered u8 array of 28×28 images.
    pub fn load(&self, category: Category, cap: usize) -> Result<Array2<u8>> {
        let path = self.data_dir.join(category.file_name());
        if !path.exists() {
            return Err(DataErr::MissingCategoryFile {
                category: category.en,
                path,
            });
        }

        let bytes = fs::read(&path).map_err(|source| DataErr::ReadFile {
            path: path.clone(),
            source,
        })?;

        let (shape, payload) = npy::parse_u8_array(&bytes).map_err(|reason| DataErr::Npy {
            path: path.clone(),
            reason,
        })?;

        let rows = match shape.as_slice() {
            [n, p] if *p == IMG_PIXELS => *n,
            [n, h, w] if *h == IMG_SIZE && *w == IMG_SIZE => *n,
            other => {
                return Err(DataErr::Npy {
                    path,
                    reason: format!("unexpected sample shape {other:?}"),
                });
            }
        };

        let keep = rows.min(cap);
        debug!(category = category.en, rows = rows, keep = keep; "loaded samples");

        // Truncation keeps the file's leading samples; no shuffling here.
        let data = payload[..keep * IMG_PIXELS].to_vec();
        let array = Array2::from_shape_vec((keep, IMG_PIXELS), data)
            .expect("shape already validated against payload length");
        Ok(array)
    }
}
