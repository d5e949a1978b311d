use log::info;
use ndarray::{Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::categories::{IMG_PIXELS, categories};
use crate::error::Result;
use crate::store::SampleStore;

/// An in-memory labeled training set: rows of normalized bitmaps paired
/// 1:1 with category indices.
#[derive(Debug, Clone)]
pub struct LabeledSet {
    x: Array2<f32>,
    y: Vec<usize>,
}

impl LabeledSet {
    pub fn new(x: Array2<f32>, y: Vec<usize>) -> Self {
        assert_eq!(x.nrows(), y.len(), "images and labels must pair 1:1");
        Self { x, y }
    }

    /// Loads every category from `store` (at most `cap` samples each),
    /// normalizes intensities to [0, 1] and tags rows with the category
    /// index. Category order follows the registry.
    pub fn assemble(store: &SampleStore, cap: usize) -> Result<Self> {
        let mut x = Array2::zeros((0, IMG_PIXELS));
        let mut y = Vec::new();

        for category in categories() {
            let raw = store.load(category, cap)?;
            let n = raw.nrows();
            info!("  {} ({}): {n} samples", category.ja, category.en);

            x.append(Axis(0), raw.mapv(|v| v as f32 / 255.0).view())
                .expect("all sample rows have IMG_PIXELS columns");
            y.extend(std::iter::repeat_n(category.index, n));
        }

        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn images(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn labels(&self) -> &[usize] {
        &self.y
    }

    /// Appends another set's rows (used to add augmented copies).
    pub fn extend(&mut self, x: &Array2<f32>, y: &[usize]) {
        assert_eq!(x.nrows(), y.len(), "images and labels must pair 1:1");
        self.x
            .append(Axis(0), x.view())
            .expect("appended rows must have IMG_PIXELS columns");
        self.y.extend_from_slice(y);
    }

    /// Reorders samples in place with the given rng.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        self.x = self.x.select(Axis(0), &order);
        self.y = order.iter().map(|&i| self.y[i]).collect();
    }

    /// Splits off a validation set of roughly `val_fraction`, stratified
    /// per category so every class appears in both halves.
    pub fn split<R: Rng>(self, val_fraction: f64, rng: &mut R) -> (Self, Self) {
        assert!((0.0..1.0).contains(&val_fraction), "fraction out of range");

        let mut val_idx = Vec::new();
        let mut train_idx = Vec::new();

        for category in categories() {
            let mut members: Vec<usize> = (0..self.len())
                .filter(|&i| self.y[i] == category.index)
                .collect();
            members.shuffle(rng);

            let n_val = (members.len() as f64 * val_fraction).round() as usize;
            val_idx.extend_from_slice(&members[..n_val]);
            train_idx.extend_from_slice(&members[n_val..]);
        }

        train_idx.shuffle(rng);
        val_idx.shuffle(rng);

        (self.take(&train_idx), self.take(&val_idx))
    }

    /// Iterates over `(images, labels)` minibatches in current order.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = (ArrayView2<'_, f32>, &[usize])> {
        assert!(batch_size > 0, "batch_size must be > 0");
        let n = self.len();
        (0..n).step_by(batch_size).map(move |start| {
            let end = (start + batch_size).min(n);
            (
                self.x.slice(ndarray::s![start..end, ..]),
                &self.y[start..end],
            )
        })
    }

    fn take(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }
}
