/// Elementwise activation applied inside a layer's forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActFn {
    Relu,
}

impl ActFn {
    pub fn f(self, x: f32) -> f32 {
        match self {
            ActFn::Relu => x.max(0.0),
        }
    }

    pub fn df(self, x: f32) -> f32 {
        match self {
            ActFn::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(ActFn::Relu.f(-2.0), 0.0);
        assert_eq!(ActFn::Relu.f(3.5), 3.5);
        assert_eq!(ActFn::Relu.df(-1.0), 0.0);
        assert_eq!(ActFn::Relu.df(0.5), 1.0);
    }
}
