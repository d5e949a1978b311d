use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use sketch_nn::Plateau;

use crate::error::{Result, TrainErr};

/// Everything one training run needs. The two constructors carry the
/// tuned defaults of each model; `with_env` lets a run override the
/// paths and scale without a rebuild.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    /// At most this many samples are read per category file.
    pub samples_per_class: usize,
    pub val_fraction: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Epochs without validation improvement before training stops.
    pub patience: usize,
    pub plateau: Option<Plateau>,
    pub augment: bool,
    pub seed: u64,
}

impl TrainConfig {
    pub fn cnn() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("export/cnn"),
            samples_per_class: 5000,
            val_fraction: 0.1,
            epochs: 20,
            batch_size: 256,
            learning_rate: 1e-3,
            patience: 5,
            plateau: Some(Plateau {
                patience: 3,
                factor: 0.5,
            }),
            augment: true,
            seed: 42,
        }
    }

    pub fn mlp() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("export/mlp"),
            samples_per_class: 3000,
            val_fraction: 0.1,
            epochs: 30,
            batch_size: 128,
            learning_rate: 1e-3,
            patience: 5,
            plateau: None,
            augment: false,
            seed: 42,
        }
    }

    /// Applies the `DATA_DIR`, `OUT_DIR`, `SAMPLES_PER_CLASS`, `EPOCHS`
    /// and `SEED` environment overrides, when set.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(dir) = env::var("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("OUT_DIR") {
            self.out_dir = PathBuf::from(dir);
        }
        if let Some(n) = parse_env("SAMPLES_PER_CLASS")? {
            self.samples_per_class = n;
        }
        if let Some(n) = parse_env("EPOCHS")? {
            self.epochs = n;
        }
        if let Some(n) = parse_env("SEED")? {
            self.seed = n;
        }
        Ok(self)
    }
}

fn parse_env<T: FromStr>(var: &'static str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|err: T::Err| TrainErr::Config {
                var,
                reason: err.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_differ_where_the_models_do() {
        let cnn = TrainConfig::cnn();
        let mlp = TrainConfig::mlp();

        assert!(cnn.augment && !mlp.augment);
        assert!(cnn.plateau.is_some() && mlp.plateau.is_none());
        assert_eq!(cnn.samples_per_class, 5000);
        assert_eq!(mlp.samples_per_class, 3000);
        assert_eq!(cnn.seed, mlp.seed);
    }
}
