use std::time::Instant;

use log::info;
use rand::{SeedableRng, rngs::StdRng};

use quickdraw_data::augment::{AugmentConfig, augment};
use quickdraw_data::{LabeledSet, NUM_CLASSES, SampleStore, categories};
use sketch_nn::{Adam, ConvNet, FitConfig, FitReport, Mlp, Network, fit};
use tfjs_export::{Label, model_json, translate, write_bundle};

use crate::config::TrainConfig;
use crate::error::Result;

/// Trains the convolutional classifier and exports it.
pub fn run_cnn(cfg: &TrainConfig) -> Result<FitReport> {
    let (train, val) = prepare(cfg)?;
    let mut net = ConvNet::new(NUM_CLASSES, cfg.seed);
    train_and_export(&mut net, &train, &val, cfg, "train_cnn")
}

/// Trains the dense classifier and exports it.
pub fn run_mlp(cfg: &TrainConfig) -> Result<FitReport> {
    let (train, val) = prepare(cfg)?;
    let mut net = Mlp::new(NUM_CLASSES, cfg.seed);
    train_and_export(&mut net, &train, &val, cfg, "train_mlp")
}

/// Loads every category, splits off the validation set, and optionally
/// doubles the training half with augmented copies.
fn prepare(cfg: &TrainConfig) -> Result<(LabeledSet, LabeledSet)> {
    let store = SampleStore::new(&cfg.data_dir);
    info!("loading samples from {}", cfg.data_dir.display());
    let set = LabeledSet::assemble(&store, cfg.samples_per_class)?;

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let (mut train, val) = set.split(cfg.val_fraction, &mut rng);
    info!(train = train.len(), val = val.len(); "split samples");

    if cfg.augment {
        let extra = augment(&train.images().to_owned(), AugmentConfig::default(), cfg.seed);
        let labels = train.labels().to_vec();
        train.extend(&extra, &labels);
        train.shuffle(&mut rng);
        info!(train = train.len(); "added augmented copies");
    }

    Ok((train, val))
}

fn train_and_export<N: Network>(
    net: &mut N,
    train: &LabeledSet,
    val: &LabeledSet,
    cfg: &TrainConfig,
    generated_by: &str,
) -> Result<FitReport> {
    let mut adam = Adam::new(cfg.learning_rate);
    let fit_cfg = FitConfig {
        epochs: cfg.epochs,
        batch_size: cfg.batch_size,
        patience: cfg.patience,
        plateau: cfg.plateau,
        seed: cfg.seed,
    };

    let started = Instant::now();
    let report = fit(
        net,
        &mut adam,
        train.images(),
        train.labels(),
        val.images(),
        val.labels(),
        &fit_cfg,
    );
    info!(
        epochs = report.epochs_run,
        val_acc = report.best_val_accuracy as f64,
        elapsed_s = started.elapsed().as_secs();
        "training finished"
    );

    let (blob, descriptors) = translate(&net.trained_layers());
    let model = model_json(&net.layer_specs(), &descriptors, generated_by);
    let labels: Vec<Label> = categories()
        .map(|c| Label {
            en: c.en.to_string(),
            ja: c.ja.to_string(),
        })
        .collect();

    write_bundle(&cfg.out_dir, &model, &blob, &labels)?;
    info!("bundle written to {}", cfg.out_dir.display());

    Ok(report)
}
