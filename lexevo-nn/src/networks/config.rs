use crate::networks::Activation;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for dense networks
/// and their gradient-based training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Activation of every hidden layer.
    pub hidden_activation: Activation,
    /// Activation of the output layer.
    pub output_activation: Activation,
    /// Number of examples per gradient step.
    pub batch_size: NonZeroUsize,
    /// Whether the example order is shuffled
    /// before every training epoch.
    pub shuffle: bool,
}

impl NetworkConfig {
    /// Returns the configuration of a tanh-hidden, linear-output
    /// regressor trained with mini-batches of 32 shuffled examples.
    ///
    /// # Examples
    /// ```
    /// use lexevo_nn::{Activation, NetworkConfig};
    ///
    /// let config = NetworkConfig {
    ///     // Specify some values here...
    ///     hidden_activation: Activation::ReLU,
    ///     // Default the rest...
    ///     ..NetworkConfig::regressor()
    /// };
    /// assert_eq!(config.batch_size.get(), 32);
    /// ```
    pub const fn regressor() -> NetworkConfig {
        NetworkConfig {
            hidden_activation: Activation::Tanh,
            output_activation: Activation::Identity,
            // SAFETY: 32 is a valid NonZeroUsize. Replace this with
            // NonZeroUsize::new(32).unwrap() once const Option::unwrap
            // becomes stable.
            batch_size: unsafe { NonZeroUsize::new_unchecked(32) },
            shuffle: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig::regressor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_configs_use_defaults() {
        let config: NetworkConfig =
            serde_json::from_str(r#"{"batch_size": 4, "output_activation": "Sigmoid"}"#).unwrap();
        assert_eq!(config.batch_size.get(), 4);
        assert_eq!(config.output_activation, Activation::Sigmoid);
        assert_eq!(config.hidden_activation, Activation::Tanh);
        assert!(config.shuffle);

        assert!(serde_json::from_str::<NetworkConfig>(r#"{"batch_size": 0}"#).is_err());
    }
}
