use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::activations::ActFn;

/// A fully-connected layer. Kernel layout is `[out, in]`.
pub struct Dense {
    w: Array2<f32>,
    b: Array1<f32>,
    act: Option<ActFn>,

    dw: Array2<f32>,
    db: Array1<f32>,

    // Forward cache for the backward pass.
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` with Kaiming-normal weights and zero biases.
    ///
    /// # Arguments
    /// * `in_features` / `out_features` - The layer's dimensions.
    /// * `act` - Optional elementwise activation.
    /// * `rng` - A random number generator.
    pub fn new<R: Rng>(
        in_features: usize,
        out_features: usize,
        act: Option<ActFn>,
        rng: &mut R,
    ) -> Self {
        let std = (2.0 / in_features as f32).sqrt();
        let w = Array2::<f32>::random_using((out_features, in_features), StandardNormal, rng) * std;

        Self {
            w,
            b: Array1::zeros(out_features),
            act,
            dw: Array2::zeros((out_features, in_features)),
            db: Array1::zeros(out_features),
            x: Array2::zeros((0, 0)),
            z: Array2::zeros((0, 0)),
        }
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        self.x = x.to_owned();
        let mut z = x.dot(&self.w.t());
        z += &self.b;
        self.z = z;

        match self.act {
            Some(act) => self.z.mapv(|v| act.f(v)),
            None => self.z.clone(),
        }
    }

    /// Consumes the upstream delta `[batch, out]` and returns the delta
    /// for the previous layer `[batch, in]`, accumulating `dw`/`db`.
    pub fn backward(&mut self, mut d: Array2<f32>) -> Array2<f32> {
        if let Some(act) = self.act {
            d.zip_mut_with(&self.z, |d, &z| *d *= act.df(z));
        }

        self.dw = d.t().dot(&self.x);
        self.db = d.sum_axis(Axis(0));
        d.dot(&self.w)
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

    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.b
    }

    pub fn in_features(&self) -> usize {
        self.w.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.w.nrows()
    }
}
