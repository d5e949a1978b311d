use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayViewMut1, Axis};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::StandardNormal;

use crate::categories::IMG_SIZE;

/// Knobs of the augmentation pass. The probabilities are empirical
/// tuning defaults, not contracts.
#[derive(Debug, Clone, Copy)]
pub struct AugmentConfig {
    pub noise_prob: f64,
    pub noise_std: f32,
    pub shift_prob: f64,
    pub max_shift: i32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            noise_prob: 0.2,
            noise_std: 0.05,
            shift_prob: 0.3,
            max_shift: 2,
        }
    }
}

/// Produces a perturbed copy of `images` (rows of flattened, normalized
/// bitmaps): gaussian noise with probability `noise_prob`, circular
/// pixel shift with probability `shift_prob`. Deterministic for a given
/// seed; rows are processed in parallel.
pub fn augment(images: &Array2<f32>, cfg: AugmentConfig, seed: u64) -> Array2<f32> {
    let mut out = images.clone();

    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));

            if rng.random_bool(cfg.noise_prob) {
                for px in row.iter_mut() {
                    let noise: f32 = rng.sample(StandardNormal);
                    *px = (*px + noise * cfg.noise_std).clamp(0.0, 1.0);
                }
            }

            if rng.random_bool(cfg.shift_prob) {
                let dx = rng.random_range(-cfg.max_shift..=cfg.max_shift);
                let dy = rng.random_range(-cfg.max_shift..=cfg.max_shift);
                roll(&mut row, dx, dy);
            }
        });

    out
}

/// Circularly shifts a flattened 28×28 bitmap by (dx, dy) pixels.
fn roll(row: &mut ArrayViewMut1<f32>, dx: i32, dy: i32) {
    let n = IMG_SIZE as i32;
    let src: Vec<f32> = row.to_vec();

    for y in 0..n {
        for x in 0..n {
            let sy = (y - dy).rem_euclid(n);
            let sx = (x - dx).rem_euclid(n);
            row[(y * n + x) as usize] = src[(sy * n + sx) as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::categories::IMG_PIXELS;

    #[test]
    fn output_shape_matches_input() {
        let images = Array2::from_elem((5, IMG_PIXELS), 0.5f32);
        let out = augment(&images, AugmentConfig::default(), 7);
        assert_eq!(out.shape(), images.shape());
    }

    #[test]
    fn values_stay_in_unit_range() {
        let images = Array2::from_elem((20, IMG_PIXELS), 1.0f32);
        let cfg = AugmentConfig {
            noise_prob: 1.0,
            ..AugmentConfig::default()
        };
        let out = augment(&images, cfg, 11);
        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn deterministic_for_a_seed() {
        let images = Array2::from_shape_fn((8, IMG_PIXELS), |(i, j)| {
            ((i * 31 + j) % 17) as f32 / 16.0
        });
        let a = augment(&images, AugmentConfig::default(), 42);
        let b = augment(&images, AugmentConfig::default(), 42);
        assert_eq!(a, b);
    }

    #[test]
    fn roll_is_circular() {
        let mut data = vec![0.0f32; IMG_PIXELS];
        data[0] = 1.0; // top-left pixel
        let mut images = Array2::from_shape_vec((1, IMG_PIXELS), data).unwrap();

        let mut row = images.row_mut(0);
        roll(&mut row, 2, 1);
        // Pixel moved right 2, down 1.
        assert_eq!(row[IMG_SIZE + 2], 1.0);
        assert_eq!(row.iter().filter(|&&v| v != 0.0).count(), 1);
    }
}
