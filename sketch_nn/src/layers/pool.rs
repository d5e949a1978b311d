use ndarray::Array4;

/// 2×2 max pooling with stride 2. Remembers which input pixel won each
/// window so the backward pass can route gradients to it.
pub struct MaxPool2d {
    in_dim: (usize, usize, usize, usize),
    // Flat input index of the winner for every output cell.
    winners: Vec<usize>,
}

impl MaxPool2d {
    pub fn new() -> Self {
        Self {
            in_dim: (0, 0, 0, 0),
            winners: Vec::new(),
        }
    }

    pub fn forward(&mut self, x: &Array4<f32>) -> Array4<f32> {
        let (batch, c, h, w) = x.dim();
        assert!(h % 2 == 0 && w % 2 == 0, "pooling needs even spatial dims");
        let (oh, ow) = (h / 2, w / 2);

        self.in_dim = x.dim();
        self.winners.clear();
        self.winners.reserve(batch * c * oh * ow);

        let flat = x.as_slice().unwrap();
        let mut out = Array4::zeros((batch, c, oh, ow));

        for bi in 0..batch {
            for ci in 0..c {
                let plane = (bi * c + ci) * h * w;
                for oy in 0..oh {
                    for ox in 0..ow {
                        let mut best_idx = plane + (oy * 2) * w + ox * 2;
                        let mut best = flat[best_idx];
                        for (dy, dx) in [(0, 1), (1, 0), (1, 1)] {
                            let idx = plane + (oy * 2 + dy) * w + ox * 2 + dx;
                            if flat[idx] > best {
                                best = flat[idx];
                                best_idx = idx;
                            }
                        }
                        out[[bi, ci, oy, ox]] = best;
                        self.winners.push(best_idx);
                    }
                }
            }
        }

        out
    }

    pub fn backward(&mut self, d: &Array4<f32>) -> Array4<f32> {
        let mut dx = Array4::zeros(self.in_dim);
        let dx_flat = dx.as_slice_mut().unwrap();

        for (&winner, &delta) in self.winners.iter().zip(d.iter()) {
            dx_flat[winner] += delta;
        }

        dx
    }
}

impl Default for MaxPool2d {
    fn default() -> Self {
        Self::new()
    }
}
