use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Inverted dropout over a dense activation. Active only during
/// training; carries no parameters and never appears in the export.
pub struct Dropout {
    prob: f64,
    rng: SmallRng,
    mask: Array2<f32>,
}

impl Dropout {
    pub fn new(prob: f64, seed: u64) -> Self {
        assert!((0.0..1.0).contains(&prob), "drop probability out of range");
        Self {
            prob,
            rng: SmallRng::seed_from_u64(seed),
            mask: Array2::zeros((0, 0)),
        }
    }

    pub fn forward(&mut self, x: Array2<f32>, train: bool) -> Array2<f32> {
        if !train {
            // Identity at evaluation time; inverted scaling below keeps
            // the expected activation equal between the two modes.
            self.mask = Array2::zeros((0, 0));
            return x;
        }

        let scale = 1.0 / (1.0 - self.prob) as f32;
        self.mask = Array2::from_shape_fn(x.dim(), |_| {
            if self.rng.random_bool(self.prob) {
                0.0
            } else {
                scale
            }
        });

        &x * &self.mask
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Array2<f32> {
        if self.mask.is_empty() {
            return d;
        }
        &d * &self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_mode_is_identity() {
        let mut dropout = Dropout::new(0.4, 0);
        let x = Array2::from_elem((3, 5), 1.5f32);
        let y = dropout.forward(x.clone(), false);
        assert_eq!(y, x);
    }

    #[test]
    fn train_mode_zeroes_and_rescales() {
        let mut dropout = Dropout::new(0.5, 7);
        let x = Array2::from_elem((10, 100), 1.0f32);
        let y = dropout.forward(x, true);

        let zeros = y.iter().filter(|&&v| v == 0.0).count();
        let kept = y.iter().filter(|&&v| v == 2.0).count();
        assert_eq!(zeros + kept, 1000);
        assert!(zeros > 300 && zeros < 700, "zeroed {zeros} of 1000");
    }

    #[test]
    fn backward_reuses_the_forward_mask() {
        let mut dropout = Dropout::new(0.5, 3);
        let x = Array2::from_elem((2, 8), 1.0f32);
        let y = dropout.forward(x, true);

        let d = Array2::from_elem((2, 8), 1.0f32);
        let dx = dropout.backward(d);
        assert_eq!(dx, y);
    }
}
