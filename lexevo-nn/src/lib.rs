//! # LexEvo-NN
//! A dense feed-forward regressor implementing the [`LexEvo` crate](https://crates.io/crates/lexevo)'s `Model` trait.
//!
//! Provides a [`DenseNetwork`] type whose weights can be evolved by a
//! `lexevo` `EvolutionEngine`, refined by mini-batch gradient descent
//! in hybrid runs, or simply trained on their own.
//!
//! [`DenseNetwork`]: crate::networks::DenseNetwork
//!
//! # Example usage: plain training versus hybrid evolution
//! ```
//! use lexevo::{EngineConfig, EvolutionEngine, Model, Topology};
//! use lexevo_nn::{DenseNetwork, NetworkConfig};
//!
//! fn main() {
//!     let inputs: Vec<Vec<f32>> = (0..32)
//!         .map(|i| {
//!             let x = i as f32 / 16.0 - 1.0;
//!             vec![x, -x]
//!         })
//!         .collect();
//!     let targets: Vec<Vec<f32>> = inputs
//!         .iter()
//!         .map(|x| vec![x.iter().map(|v| v * v).sum()])
//!         .collect();
//!
//!     let topology = Topology::new(vec![2, 6, 1]).unwrap();
//!     let config = NetworkConfig {
//!         batch_size: std::num::NonZeroUsize::new(8).unwrap(),
//!         ..NetworkConfig::regressor()
//!     };
//!
//!     // Gradient descent alone.
//!     let mut network = DenseNetwork::with_config(topology.clone(), config.clone(), 0);
//!     network.train(&inputs, &targets, 20, 0.05);
//!
//!     // Lexicase evolution with refined parents.
//!     let model = DenseNetwork::with_config(topology, config, 0);
//!     let mut engine = EvolutionEngine::new(
//!         EngineConfig {
//!             population_size: 6,
//!             selection_size: 3,
//!             generations: 2,
//!             learning_rate: 0.05,
//!             epochs: 5,
//!             ..EngineConfig::default()
//!         },
//!         model,
//!         0,
//!     )
//!     .unwrap();
//!     let best = engine.run(&inputs, &targets).unwrap();
//!
//!     println!(
//!         "trained: {}, evolved: {:?}",
//!         network.loss(network.weights(), &inputs, &targets),
//!         best.fitness()
//!     );
//!     assert_eq!(network.predict(&inputs).len(), inputs.len());
//! }
//! ```

pub mod networks;

pub use networks::{Activation, DenseNetwork, NetworkConfig};
