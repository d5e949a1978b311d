use std::error::Error;
use std::fmt::{self, Display, Formatter};

use quickdraw_data::DataErr;
use tfjs_export::ExportErr;

pub type Result<T> = std::result::Result<T, TrainErr>;

#[derive(Debug)]
pub enum TrainErr {
    Data(DataErr),
    Export(ExportErr),
    Config { var: &'static str, reason: String },
}

impl Display for TrainErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(err) => write!(f, "loading samples: {err}"),
            Self::Export(err) => write!(f, "exporting bundle: {err}"),
            Self::Config { var, reason } => {
                write!(f, "invalid environment override {var}: {reason}")
            }
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Data(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Config { .. } => None,
        }
    }
}

impl From<DataErr> for TrainErr {
    fn from(err: DataErr) -> Self {
        Self::Data(err)
    }
}

impl From<ExportErr> for TrainErr {
    fn from(err: ExportErr) -> Self {
        Self::Export(err)
    }
}
