use ndarray::{Array2, ArrayView2};

/// Row-wise, numerically stable softmax.
pub fn softmax(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut out = logits.to_owned();
    for mut row in out.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Mean cross-entropy of the softmax over `logits` against the target
/// class indices.
pub fn cross_entropy(logits: ArrayView2<f32>, targets: &[usize]) -> f32 {
    assert_eq!(logits.nrows(), targets.len(), "one target per row");
    let probs = softmax(logits);

    let total: f32 = probs
        .outer_iter()
        .zip(targets)
        .map(|(row, &t)| -(row[t].max(1e-12)).ln())
        .sum();
    total / targets.len() as f32
}

/// Gradient of the mean softmax cross-entropy with respect to the
/// logits: `(softmax - onehot) / batch`.
pub fn cross_entropy_delta(logits: ArrayView2<f32>, targets: &[usize]) -> Array2<f32> {
    assert_eq!(logits.nrows(), targets.len(), "one target per row");
    let batch = targets.len() as f32;

    let mut delta = softmax(logits);
    for (mut row, &t) in delta.rows_mut().into_iter().zip(targets) {
        row[t] -= 1.0;
    }
    delta /= batch;
    delta
}

/// Number of rows whose argmax equals the target.
pub fn correct(logits: ArrayView2<f32>, targets: &[usize]) -> usize {
    assert_eq!(logits.nrows(), targets.len(), "one target per row");
    logits
        .outer_iter()
        .zip(targets)
        .filter(|(row, t)| argmax(row.view()) == **t)
        .count()
}

/// Fraction of rows whose argmax equals the target.
pub fn accuracy(logits: ArrayView2<f32>, targets: &[usize]) -> f32 {
    correct(logits, targets) as f32 / targets.len() as f32
}

fn argmax(row: ndarray::ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Per-batch counters folded into an epoch summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpochStats {
    loss_sum: f32,
    hits: usize,
    samples: usize,
    batches: usize,
}

impl EpochStats {
    pub fn record(&mut self, logits: ArrayView2<f32>, targets: &[usize], loss: f32) {
        self.loss_sum += loss;
        self.batches += 1;
        self.samples += targets.len();
        self.hits += correct(logits, targets);
    }

    pub fn loss(&self) -> f32 {
        if self.batches == 0 {
            0.0
        } else {
            self.loss_sum / self.batches as f32
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            self.hits as f32 / self.samples as f32
        }
    }
}
