//! Dense feed-forward networks whose weights are
//! held in `lexevo` [`WeightSet`]s, so that they
//! can be both evolved and trained by gradient
//! descent.
//!
//! [`WeightSet`]: lexevo::WeightSet
mod activation;
mod config;
mod dense;

pub use activation::Activation;
pub use config::NetworkConfig;
pub use dense::DenseNetwork;
