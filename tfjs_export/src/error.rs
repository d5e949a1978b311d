use std::{error::Error, fmt, io, path::PathBuf};

/// The export module's result type.
pub type Result<T> = std::result::Result<T, ExportErr>;

/// Failures while writing the export bundle.
#[derive(Debug)]
pub enum ExportErr {
    /// Could not create the output directory.
    CreateDir { path: PathBuf, source: io::Error },
    /// Could not write one of the bundle files.
    WriteFile { path: PathBuf, source: io::Error },
    /// The topology or label list could not be serialized to JSON.
    Json(serde_json::Error),
}

impl fmt::Display for ExportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportErr::CreateDir { path, source } => {
                write!(f, "cannot create output dir '{}': {source}", path.display())
            }
            ExportErr::WriteFile { path, source } => {
                write!(f, "cannot write '{}': {source}", path.display())
            }
            ExportErr::Json(e) => write!(f, "json serialization failed: {e}"),
        }
    }
}

impl Error for ExportErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportErr::CreateDir { source, .. } | ExportErr::WriteFile { source, .. } => {
                Some(source)
            }
            ExportErr::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ExportErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
