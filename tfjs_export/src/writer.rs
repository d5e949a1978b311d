use std::{fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExportErr, Result};

/// One entry of `labels.json`. Array index equals the category's
/// classification index, which equals the final layer's output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub en: String,
    pub ja: String,
}

/// Writes the three-file bundle into `out_dir`, creating it if absent.
///
/// Write order is topology first, then the blob, then the labels, so a
/// crash mid-export can leave a topology pointing at a missing blob for
/// as short a window as possible but never a blob without its topology.
pub fn write_bundle(
    out_dir: &Path,
    model: &Value,
    blob: &[u8],
    labels: &[Label],
) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|source| ExportErr::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let model_path = out_dir.join("model.json");
    let model_bytes = serde_json::to_vec(model)?;
    write_file(&model_path, &model_bytes)?;

    let blob_path = out_dir.join("weights.bin");
    write_file(&blob_path, blob)?;

    let labels_path = out_dir.join("labels.json");
    let labels_bytes = serde_json::to_vec_pretty(labels)?;
    write_file(&labels_path, &labels_bytes)?;

    info!(
        "wrote bundle: model.json ({:.1}KB), weights.bin ({:.1}KB), labels.json ({} entries)",
        model_bytes.len() as f64 / 1024.0,
        blob.len() as f64 / 1024.0,
        labels.len()
    );

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| ExportErr::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
