use std::{error::Error, fmt, io, path::PathBuf};

/// The data module's result type.
pub type Result<T> = std::result::Result<T, DataErr>;

/// Failures while loading sketch samples.
#[derive(Debug)]
pub enum DataErr {
    /// A category's sample file is absent. Fatal: retrying never helps
    /// without provisioning the file first, so the message names the
    /// exact path the operator must supply.
    MissingCategoryFile { category: &'static str, path: PathBuf },
    /// A sample file exists but could not be read.
    ReadFile { path: PathBuf, source: io::Error },
    /// A sample file is not a `.npy` array of the expected kind.
    Npy { path: PathBuf, reason: String },
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::MissingCategoryFile { category, path } => write!(
                f,
                "no sample file for category '{category}': expected '{}', download the \
                 quickdraw bitmap set for this category first",
                path.display()
            ),
            DataErr::ReadFile { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            DataErr::Npy { path, reason } => {
                write!(f, "invalid npy file '{}': {reason}", path.display())
            }
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::ReadFile { source, .. } => Some(source),
            _ => None,
        }
    }
}
