//! Evolutionary optimization of the weights of fixed-topology
//! feed-forward networks, using lexicase selection.
//!
//! A population of candidate [`WeightSet`]s is evaluated on every
//! (training example, error metric) pair, parents are chosen by
//! lexicase selection over those cases, and offspring are bred by
//! mutation. In hybrid mode (a positive learning rate), selected
//! parents are first refined by gradient descent and offspring may
//! also be recombinations of two parents.
//!
//! The network itself is opaque to evolution: anything implementing
//! [`Model`] can be evolved. A dense feed-forward regressor is
//! supplied by the `lexevo-nn` crate.
//!
//! # Example usage: fitting a parabola with a hybrid run, using `lexevo-nn`
//! ```
//! use lexevo::{EngineConfig, EvolutionEngine, Model, Topology};
//! use lexevo_nn::DenseNetwork;
//!
//! fn main() {
//!     let inputs: Vec<Vec<f32>> = (-10..=10).map(|i| vec![i as f32 / 10.0]).collect();
//!     let targets: Vec<Vec<f32>> = inputs.iter().map(|x| vec![x[0] * x[0]]).collect();
//!
//!     let topology = Topology::single_hidden(1, 8, 1).unwrap();
//!     let model = DenseNetwork::build(topology, 0);
//!
//!     let config = EngineConfig {
//!         population_size: 10,
//!         selection_size: 4,
//!         generations: 5,
//!         learning_rate: 0.05,
//!         epochs: 10,
//!         cases: vec!["mse".to_string(), "l1".to_string()],
//!         ..EngineConfig::default()
//!     };
//!
//!     let mut engine = EvolutionEngine::new(config, model, 42).unwrap();
//!     let best = engine.run(&inputs, &targets).unwrap();
//!     println!("best mse: {:?}", best.fitness());
//!
//!     for log in engine.logger().iter() {
//!         println!("{}", log);
//!     }
//!
//!     let fitted = engine.fitted_model().unwrap();
//!     let predictions = fitted.predict(&inputs);
//!     assert_eq!(predictions.len(), inputs.len());
//! }
//! ```

mod evaluation;
pub mod metrics;
mod model;
mod operators;
mod populations;
pub mod rng;
pub mod weights;

#[cfg(test)]
mod testing;

pub use evaluation::{Evaluation, FitnessEvaluator};
pub use metrics::{ErrorMetric, MetricRegistry};
pub use model::Model;
pub use operators::*;
pub use populations::*;
pub use weights::{Layer, LayerShape, ShapeMismatch, Topology, TopologyError, WeightSet};
