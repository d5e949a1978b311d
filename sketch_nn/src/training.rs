use log::{debug, info};
use ndarray::{ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::{SeedableRng, rngs::StdRng};

use crate::loss::{EpochStats, cross_entropy, cross_entropy_delta};
use crate::network::Network;
use crate::optim::Optimizer;

/// Halves the learning rate after the validation loss stalls.
#[derive(Debug, Clone, Copy)]
pub struct Plateau {
    pub patience: usize,
    pub factor: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Epochs without validation improvement before training stops.
    pub patience: usize,
    pub plateau: Option<Plateau>,
    /// Seed for the per-epoch sample shuffle.
    pub seed: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FitReport {
    pub epochs_run: usize,
    pub best_val_loss: f32,
    pub best_val_accuracy: f32,
}

/// Minibatch training with early stopping on the validation loss.
///
/// The parameters of the best validation epoch are restored into the
/// network before returning, so the caller always exports the best
/// model seen rather than the last one.
pub fn fit<N: Network, O: Optimizer>(
    net: &mut N,
    opt: &mut O,
    train_x: ArrayView2<f32>,
    train_y: &[usize],
    val_x: ArrayView2<f32>,
    val_y: &[usize],
    cfg: &FitConfig,
) -> FitReport {
    assert_eq!(train_x.nrows(), train_y.len(), "one label per training row");
    assert_eq!(val_x.nrows(), val_y.len(), "one label per validation row");

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut order: Vec<usize> = (0..train_x.nrows()).collect();

    let mut best = FitReport {
        epochs_run: 0,
        best_val_loss: f32::INFINITY,
        best_val_accuracy: 0.0,
    };
    let mut best_params = net.snapshot();
    let mut since_best = 0usize;
    let mut since_decay = 0usize;

    for epoch in 1..=cfg.epochs {
        order.shuffle(&mut rng);

        let mut train_stats = EpochStats::default();
        for chunk in order.chunks(cfg.batch_size) {
            let x = train_x.select(Axis(0), chunk);
            let y: Vec<usize> = chunk.iter().map(|&i| train_y[i]).collect();

            let logits = net.forward(x.view(), true);
            let loss = cross_entropy(logits.view(), &y);
            train_stats.record(logits.view(), &y, loss);

            let delta = cross_entropy_delta(logits.view(), &y);
            net.backward(delta);
            opt.step(&mut net.param_grads());
        }

        let (val_loss, val_acc) = evaluate(net, val_x, val_y, cfg.batch_size);
        info!(
            epoch = epoch,
            train_loss = train_stats.loss() as f64,
            train_acc = train_stats.accuracy() as f64,
            val_loss = val_loss as f64,
            val_acc = val_acc as f64,
            lr = opt.learning_rate() as f64;
            "epoch complete"
        );

        if val_loss < best.best_val_loss {
            best.best_val_loss = val_loss;
            best.best_val_accuracy = val_acc;
            best_params = net.snapshot();
            since_best = 0;
            since_decay = 0;
        } else {
            since_best += 1;
            since_decay += 1;

            if let Some(plateau) = cfg.plateau {
                if since_decay >= plateau.patience {
                    let lr = opt.learning_rate() * plateau.factor;
                    opt.set_learning_rate(lr);
                    since_decay = 0;
                    debug!(lr = lr as f64; "validation loss plateaued, reducing learning rate");
                }
            }
        }

        best.epochs_run = epoch;
        if since_best >= cfg.patience {
            info!(epoch = epoch; "early stopping, validation loss stopped improving");
            break;
        }
    }

    net.restore(&best_params);
    best
}

/// Mean loss and accuracy over a held-out set, batched to bound memory.
pub fn evaluate<N: Network>(
    net: &mut N,
    x: ArrayView2<f32>,
    y: &[usize],
    batch_size: usize,
) -> (f32, f32) {
    let mut stats = EpochStats::default();
    let indices: Vec<usize> = (0..x.nrows()).collect();
    for chunk in indices.chunks(batch_size) {
        let xb = x.select(Axis(0), chunk);
        let yb: Vec<usize> = chunk.iter().map(|&i| y[i]).collect();
        let logits = net.forward(xb.view(), false);
        let loss = cross_entropy(logits.view(), &yb);
        stats.record(logits.view(), &yb, loss);
    }
    (stats.loss(), stats.accuracy())
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::models::Mlp;
    use crate::optim::Adam;

    // Three classes that light up disjoint pixel bands, trivially
    // separable.
    fn banded(samples: usize) -> (Array2<f32>, Vec<usize>) {
        let x = Array2::from_shape_fn((samples, 784), |(i, j)| {
            let class = i % 3;
            if j / 261 == class { 1.0 } else { 0.0 }
        });
        let y = (0..samples).map(|i| i % 3).collect();
        (x, y)
    }

    #[test]
    fn learns_a_separable_problem() {
        let (train_x, train_y) = banded(30);
        let (val_x, val_y) = banded(9);

        let mut net = Mlp::new(3, 11);
        let mut adam = Adam::new(1e-3);
        let cfg = FitConfig {
            epochs: 15,
            batch_size: 10,
            patience: 15,
            plateau: None,
            seed: 42,
        };

        let report = fit(
            &mut net,
            &mut adam,
            train_x.view(),
            &train_y,
            val_x.view(),
            &val_y,
            &cfg,
        );
        assert!(
            report.best_val_accuracy > 0.99,
            "val accuracy {}",
            report.best_val_accuracy
        );
    }

    #[test]
    fn restores_the_best_epoch_weights() {
        let (train_x, train_y) = banded(12);
        let (val_x, val_y) = banded(6);

        let mut net = Mlp::new(3, 5);
        let mut adam = Adam::new(1e-3);
        let cfg = FitConfig {
            epochs: 8,
            batch_size: 6,
            patience: 8,
            plateau: None,
            seed: 1,
        };
        let report = fit(
            &mut net,
            &mut adam,
            train_x.view(),
            &train_y,
            val_x.view(),
            &val_y,
            &cfg,
        );

        let (val_loss, _) = evaluate(&mut net, val_x.view(), &val_y, 6);
        assert!((val_loss - report.best_val_loss).abs() < 1e-5);
    }

    #[test]
    fn plateau_decay_lowers_the_learning_rate() {
        // Validation labels contradict the training labels on identical
        // inputs, so the validation loss only gets worse and the
        // scheduler must fire.
        let train_x = Array2::from_elem((8, 784), 0.5f32);
        let train_y = vec![0usize; 8];
        let val_x = Array2::from_elem((4, 784), 0.5f32);
        let val_y = vec![1usize; 4];

        let mut net = Mlp::new(2, 3);
        let mut adam = Adam::new(1e-3);
        let cfg = FitConfig {
            epochs: 10,
            batch_size: 8,
            patience: 10,
            plateau: Some(Plateau {
                patience: 2,
                factor: 0.5,
            }),
            seed: 0,
        };
        let _ = fit(
            &mut net,
            &mut adam,
            train_x.view(),
            &train_y,
            val_x.view(),
            &val_y,
            &cfg,
        );
        assert!(adam.learning_rate() < 1e-3);
    }
}
