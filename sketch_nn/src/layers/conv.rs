use ndarray::{Array1, Array2, Array4, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::activations::ActFn;

/// A 2D convolution with stride 1 and "same" zero padding, implemented
/// as im2col + matmul so the backward pass is two more matmuls.
///
/// Kernel layout is `[out, in, kh, kw]`.
pub struct Conv2d {
    w: Array4<f32>,
    b: Array1<f32>,
    act: ActFn,
    kh: usize,
    kw: usize,

    dw: Array4<f32>,
    db: Array1<f32>,

    // Forward cache.
    cols: Array2<f32>,
    in_dim: (usize, usize, usize, usize),
    z: Array4<f32>,
}

impl Conv2d {
    /// Creates a new `Conv2d` with Kaiming-normal weights and zero biases.
    ///
    /// # Arguments
    /// * `in_channels` / `out_channels` - Channel counts.
    /// * `kernel` - Spatial kernel size `(kh, kw)`; must be odd for
    ///   "same" padding.
    /// * `act` - Elementwise activation.
    /// * `rng` - A random number generator.
    pub fn new<R: Rng>(
        in_channels: usize,
        out_channels: usize,
        kernel: (usize, usize),
        act: ActFn,
        rng: &mut R,
    ) -> Self {
        let (kh, kw) = kernel;
        assert!(kh % 2 == 1 && kw % 2 == 1, "same padding needs odd kernels");

        let fan_in = in_channels * kh * kw;
        let std = (2.0 / fan_in as f32).sqrt();
        let w = Array4::<f32>::random_using(
            (out_channels, in_channels, kh, kw),
            StandardNormal,
            rng,
        ) * std;

        Self {
            w,
            b: Array1::zeros(out_channels),
            act,
            kh,
            kw,
            dw: Array4::zeros((out_channels, in_channels, kh, kw)),
            db: Array1::zeros(out_channels),
            cols: Array2::zeros((0, 0)),
            in_dim: (0, 0, 0, 0),
            z: Array4::zeros((0, 0, 0, 0)),
        }
    }

    /// Forward pass over `[batch, channels, h, w]` input.
    pub fn forward(&mut self, x: &Array4<f32>) -> Array4<f32> {
        let (batch, in_ch, h, w) = x.dim();
        let out_ch = self.w.shape()[0];
        assert_eq!(in_ch, self.w.shape()[1], "input channel mismatch");

        self.in_dim = x.dim();
        self.cols = im2col(x, self.kh, self.kw);

        let k = in_ch * self.kh * self.kw;
        let wm = self
            .w
            .view()
            .into_shape_with_order((out_ch, k))
            .unwrap();

        let mut out = wm.dot(&self.cols); // [out_ch, batch*h*w]
        out += &self.b.view().insert_axis(Axis(1));

        self.z = out
            .into_shape_with_order((out_ch, batch, h, w))
            .unwrap()
            .permuted_axes([1, 0, 2, 3])
            .as_standard_layout()
            .into_owned();

        self.z.mapv(|v| self.act.f(v))
    }

    /// Consumes the upstream delta `[batch, out_ch, h, w]` and returns
    /// the delta for the previous layer, accumulating `dw`/`db`.
    pub fn backward(&mut self, mut d: Array4<f32>) -> Array4<f32> {
        d.zip_mut_with(&self.z, |d, &z| *d *= self.act.df(z));

        let (batch, out_ch, h, w) = d.dim();
        let (_, in_ch, _, _) = self.in_dim;
        let k = in_ch * self.kh * self.kw;

        let dmat = d
            .permuted_axes([1, 0, 2, 3])
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((out_ch, batch * h * w))
            .unwrap();

        self.dw = dmat
            .dot(&self.cols.t())
            .into_shape_with_order((out_ch, in_ch, self.kh, self.kw))
            .unwrap();
        self.db = dmat.sum_axis(Axis(1));

        let wm = self
            .w
            .view()
            .into_shape_with_order((out_ch, k))
            .unwrap();
        let dcols = wm.t().dot(&dmat); // [k, batch*h*w]

        col2im(&dcols, self.in_dim, self.kh, self.kw)
    }

    /// Parameter/gradient slice pairs, kernel first then bias.
    pub fn param_grads(&mut self) -> [(&mut [f32], &[f32]); 2] {
        [
            (
                self.w.as_slice_mut().unwrap(),
                self.dw.as_slice().unwrap(),
            ),
            (
                self.b.as_slice_mut().unwrap(),
                self.db.as_slice().unwrap(),
            ),
        ]
    }

    pub fn weights(&self) -> &Array4<f32> {
        &self.w
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.b
    }

    pub fn out_channels(&self) -> usize {
        self.w.shape()[0]
    }

    pub fn kernel(&self) -> (usize, usize) {
        (self.kh, self.kw)
    }
}

/// Unfolds `[batch, c, h, w]` into `[c*kh*kw, batch*h*w]` patches with
/// "same" zero padding. Column index is `b*(h*w) + y*w + x`.
fn im2col(x: &Array4<f32>, kh: usize, kw: usize) -> Array2<f32> {
    let (batch, c, h, w) = x.dim();
    let (ph, pw) = ((kh / 2) as isize, (kw / 2) as isize);
    let mut cols = Array2::zeros((c * kh * kw, batch * h * w));

    for bi in 0..batch {
        for ci in 0..c {
            for ky in 0..kh {
                for kx in 0..kw {
                    let row = (ci * kh + ky) * kw + kx;
                    for oy in 0..h {
                        let iy = oy as isize + ky as isize - ph;
                        if iy < 0 || iy >= h as isize {
                            continue;
                        }
                        for ox in 0..w {
                            let ix = ox as isize + kx as isize - pw;
                            if ix < 0 || ix >= w as isize {
                                continue;
                            }
                            let col = (bi * h + oy) * w + ox;
                            cols[[row, col]] = x[[bi, ci, iy as usize, ix as usize]];
                        }
                    }
                }
            }
        }
    }

    cols
}

/// Folds patch gradients back onto the input, accumulating overlaps.
fn col2im(
    dcols: &Array2<f32>,
    in_dim: (usize, usize, usize, usize),
    kh: usize,
    kw: usize,
) -> Array4<f32> {
    let (batch, c, h, w) = in_dim;
    let (ph, pw) = ((kh / 2) as isize, (kw / 2) as isize);
    let mut dx = Array4::zeros(in_dim);

    for bi in 0..batch {
        for ci in 0..c {
            for ky in 0..kh {
                for kx in 0..kw {
                    let row = (ci * kh + ky) * kw + kx;
                    for oy in 0..h {
                        let iy = oy as isize + ky as isize - ph;
                        if iy < 0 || iy >= h as isize {
                            continue;
                        }
                        for ox in 0..w {
                            let ix = ox as isize + kx as isize - pw;
                            if ix < 0 || ix >= w as isize {
                                continue;
                            }
                            let col = (bi * h + oy) * w + ox;
                            dx[[bi, ci, iy as usize, ix as usize]] += dcols[[row, col]];
                        }
                    }
                }
            }
        }
    }

    dx
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn identity_kernel_reproduces_input() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut conv = Conv2d::new(1, 1, (3, 3), ActFn::Relu, &mut rng);

        // Center tap 1, everything else 0.
        conv.w.fill(0.0);
        conv.w[[0, 0, 1, 1]] = 1.0;
        conv.b.fill(0.0);

        let x = Array4::from_shape_fn((1, 1, 4, 4), |(_, _, y, x)| (y * 4 + x) as f32);
        let y = conv.forward(&x);
        assert_eq!(y, x);
    }

    #[test]
    fn same_padding_keeps_spatial_dims() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conv2d::new(2, 5, (3, 3), ActFn::Relu, &mut rng);
        let x = Array4::zeros((3, 2, 7, 7));
        let y = conv.forward(&x);
        assert_eq!(y.dim(), (3, 5, 7, 7));
    }

    #[test]
    fn sum_kernel_computes_neighborhood_sums() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut conv = Conv2d::new(1, 1, (3, 3), ActFn::Relu, &mut rng);
        conv.w.fill(1.0);
        conv.b.fill(0.0);

        let x = Array4::from_elem((1, 1, 3, 3), 1.0f32);
        let y = conv.forward(&x);
        // Corner sees a 2x2 window, center the full 3x3.
        assert_eq!(y[[0, 0, 0, 0]], 4.0);
        assert_eq!(y[[0, 0, 1, 1]], 9.0);
        assert_eq!(y[[0, 0, 0, 1]], 6.0);
    }

    #[test]
    fn weight_gradient_equals_window_sums_on_the_linear_region() {
        // With the relu everywhere linear and an all-ones upstream delta,
        // dw[o, 0, ky, kx] is exactly the sum of the padded input over
        // every window position, independent of the kernel values.
        let mut rng = StdRng::seed_from_u64(4);
        let x = Array4::from_shape_fn((2, 1, 4, 4), |(b, _, y, x)| {
            (b * 16 + y * 4 + x) as f32 * 0.001
        });

        let mut conv = Conv2d::new(1, 2, (3, 3), ActFn::Relu, &mut rng);
        conv.w.fill(0.1);
        conv.b.fill(0.5);
        let _ = conv.forward(&x);
        let _ = conv.backward(Array4::ones((2, 2, 4, 4)));

        for o in 0..2 {
            for ky in 0..3i32 {
                for kx in 0..3i32 {
                    let mut expected = 0.0f32;
                    for b in 0..2 {
                        for oy in 0..4i32 {
                            for ox in 0..4i32 {
                                let (iy, ix) = (oy + ky - 1, ox + kx - 1);
                                if (0..4).contains(&iy) && (0..4).contains(&ix) {
                                    expected += x[[b, 0, iy as usize, ix as usize]];
                                }
                            }
                        }
                    }
                    let got = conv.dw[[o, 0, ky as usize, kx as usize]];
                    assert!(
                        (got - expected).abs() < 1e-4,
                        "dw[[{o},0,{ky},{kx}]]: {got} vs {expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn backward_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = Array4::from_shape_fn((2, 1, 4, 4), |(b, _, y, x)| {
            ((b * 16 + y * 4 + x) as f32 * 0.1).sin() * 0.01
        });

        let mut conv = Conv2d::new(1, 2, (3, 3), ActFn::Relu, &mut rng);
        // Bias keeps every pre-activation on the linear side of the relu
        // while staying small: a large bias would inflate the probed
        // objective until f32 rounding drowns the central difference.
        conv.b.fill(0.5);
        let _ = conv.forward(&x);
        let d = Array4::ones((2, 2, 4, 4));
        let _ = conv.backward(d);
        let analytic = conv.dw.clone();

        let eps = 1e-3;
        // Objective accumulated in f64 so the difference of two nearly
        // equal sums keeps enough significant digits.
        let probe_at = |conv: &Conv2d, idx: [usize; 4], delta: f32| -> f64 {
            let mut w = conv.w.clone();
            w[idx] += delta;
            let mut probe = Conv2d {
                w,
                b: conv.b.clone(),
                act: conv.act,
                kh: conv.kh,
                kw: conv.kw,
                dw: conv.dw.clone(),
                db: conv.db.clone(),
                cols: Array2::zeros((0, 0)),
                in_dim: (0, 0, 0, 0),
                z: Array4::zeros((0, 0, 0, 0)),
            };
            probe.forward(&x).iter().map(|&v| v as f64).sum()
        };

        for o in 0..2 {
            for ky in 0..3 {
                for kx in 0..3 {
                    let idx = [o, 0, ky, kx];
                    let numeric =
                        (probe_at(&conv, idx, eps) - probe_at(&conv, idx, -eps)) / (2.0 * eps as f64);
                    assert!(
                        (analytic[idx] as f64 - numeric).abs() < 1e-2,
                        "dw[{idx:?}]: analytic {} vs numeric {numeric}",
                        analytic[idx]
                    );
                }
            }
        }
    }
}
