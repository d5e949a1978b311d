/// Updates every parameter tensor of a network in place from its
/// accumulated gradient. One call per minibatch.
pub trait Optimizer {
    fn step(&mut self, params: &mut [(&mut [f32], &[f32])]);

    fn set_learning_rate(&mut self, learning_rate: f32);

    fn learning_rate(&self) -> f32;
}

/// Adam with bias correction kept as running beta products.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    epsilon: f32,
    // One (v, s) moment pair per parameter tensor, allocated lazily on
    // the first step so the optimizer needs no shape knowledge upfront.
    moments: Vec<(Box<[f32]>, Box<[f32]>)>,
}

impl Adam {
    /// Creates a new `Adam` optimizer with the usual defaults for the
    /// remaining hyperparameters.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    pub fn new(learning_rate: f32) -> Self {
        Self::with_betas(learning_rate, 0.9, 0.999, 1e-8)
    }

    pub fn with_betas(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            epsilon,
            moments: Vec::new(),
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [(&mut [f32], &[f32])]) {
        if self.moments.is_empty() {
            self.moments = params
                .iter()
                .map(|(p, _)| {
                    (
                        vec![0.; p.len()].into_boxed_slice(),
                        vec![0.; p.len()].into_boxed_slice(),
                    )
                })
                .collect();
        }
        assert_eq!(
            self.moments.len(),
            params.len(),
            "optimizer bound to a different network"
        );

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        for ((param, grad), (v, s)) in params.iter_mut().zip(self.moments.iter_mut()) {
            assert_eq!(param.len(), grad.len(), "gradient length mismatch");

            param
                .iter_mut()
                .zip(grad.iter())
                .zip(v.iter_mut())
                .zip(s.iter_mut())
                .for_each(|(((p, g), v), s)| {
                    *v = b1 * *v + (1. - b1) * g;
                    *s = b2 * *s + (1. - b2) * g.powi(2);
                    *p -= step_size * *v / (s.sqrt() + eps);
                });
        }
    }

    fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_roughly_the_learning_rate() {
        // With fresh moments the bias-corrected update is ~lr * sign(g)
        // regardless of the gradient's magnitude.
        let mut adam = Adam::new(0.1);
        let mut p = [1.0f32];
        let g = [250.0f32];
        adam.step(&mut [(&mut p, &g)]);
        assert!((p[0] - 0.9).abs() < 1e-3, "p = {}", p[0]);
    }

    #[test]
    fn minimizes_a_quadratic() {
        // f(p) = (p - 3)^2, gradient 2(p - 3).
        let mut adam = Adam::new(0.05);
        let mut p = [0.0f32];
        for _ in 0..500 {
            let g = [2.0 * (p[0] - 3.0)];
            adam.step(&mut [(&mut p, &g)]);
        }
        assert!((p[0] - 3.0).abs() < 1e-2, "p = {}", p[0]);
    }

    #[test]
    fn learning_rate_is_adjustable() {
        let mut adam = Adam::new(1e-3);
        adam.set_learning_rate(5e-4);
        assert_eq!(adam.learning_rate(), 5e-4);
    }

    #[test]
    #[should_panic(expected = "gradient length mismatch")]
    fn rejects_mismatched_gradients() {
        let mut adam = Adam::new(0.1);
        let mut p = [0.0f32; 3];
        let g = [0.0f32; 2];
        adam.step(&mut [(&mut p, &g)]);
    }
}
