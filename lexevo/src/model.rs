use crate::weights::{ShapeMismatch, Topology, WeightSet};

/// An interface for fixed-topology regressors whose
/// weights can be evolved.
///
/// The model owns the network's topology and mechanics
/// (forward pass, loss, backpropagation); evolution only
/// ever handles [`WeightSet`]s and asks the model to
/// evaluate or refine them.
///
/// Implementors must be [`Sync`], as evaluation and
/// refinement of distinct weight sets run in parallel.
pub trait Model: Sync {
    /// Constructs a network with the given topology,
    /// with its own weights initialized from `seed`.
    fn build(topology: Topology, seed: u64) -> Self
    where
        Self: Sized;

    /// Returns the network's topology.
    fn topology(&self) -> &Topology;

    /// Returns the network's predictions for every input
    /// when using `weights`.
    ///
    /// Must not depend on nor modify any state other than
    /// its arguments.
    fn evaluate(&self, weights: &WeightSet, inputs: &[Vec<f32>]) -> Vec<Vec<f32>>;

    /// Runs `epochs` passes of gradient descent starting from
    /// `weights` and returns the refined weights.
    fn refine(
        &self,
        weights: &WeightSet,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        epochs: usize,
        learning_rate: f32,
    ) -> WeightSet;

    /// Returns a copy of the network's own weights.
    fn get_weights(&self) -> WeightSet;

    /// Replaces the network's own weights.
    ///
    /// # Errors
    /// Returns an error if `weights` does not conform
    /// to the network's topology.
    fn set_weights(&mut self, weights: WeightSet) -> Result<(), ShapeMismatch>;

    /// Returns the network's predictions using its own weights.
    fn predict(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.evaluate(&self.get_weights(), inputs)
    }
}
