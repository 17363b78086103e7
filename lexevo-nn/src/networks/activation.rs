use serde::{Deserialize, Serialize};

/// The activation function applied to a layer's
/// affine output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    // tanh(x)
    Tanh,
    // x
    Identity,
    // 1 / (1 + exp(-x))
    Sigmoid,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
}

impl Activation {
    /// Applies the function to `x`.
    ///
    /// # Examples
    /// ```
    /// use lexevo_nn::Activation;
    ///
    /// assert_eq!(Activation::Identity.apply(-2.0), -2.0);
    /// assert_eq!(Activation::ReLU.apply(-2.0), 0.0);
    /// assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
    /// assert_eq!(Activation::Tanh.apply(0.0), 0.0);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::ReLU => x.max(0.0),
        }
    }

    /// The function's derivative at `x`.
    pub fn derivative(self, x: f32) -> f32 {
        match self {
            Activation::Tanh => 1.0 - x.tanh().powi(2),
            Activation::Identity => 1.0,
            Activation::Sigmoid => {
                let s = self.apply(x);
                s * (1.0 - s)
            }
            Activation::ReLU => {
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
    fn derivatives_match_finite_differences() {
        const H: f32 = 1e-3;
        for activation in [
            Activation::Tanh,
            Activation::Identity,
            Activation::Sigmoid,
            Activation::ReLU,
        ] {
            for x in [-1.7f32, -0.4, 0.3, 1.1, 2.5] {
                let numeric = (activation.apply(x + H) - activation.apply(x - H)) / (2.0 * H);
                assert!(
                    (numeric - activation.derivative(x)).abs() < 1e-2,
                    "{:?} at {}",
                    activation,
                    x
                );
            }
        }
    }

    #[test]
    fn relu_is_flat_below_zero() {
        assert_eq!(Activation::ReLU.derivative(-0.5), 0.0);
        assert_eq!(Activation::ReLU.apply(-0.5), 0.0);
        assert_eq!(Activation::ReLU.apply(0.5), 0.5);
    }
}
