//! Test doubles shared by unit tests.

use crate::model::Model;
use crate::rng::seeded;
use crate::weights::{LayerShape, Layer, ShapeMismatch, Topology, WeightSet};

use std::sync::atomic::{AtomicUsize, Ordering};

/// A single affine layer trained by full-batch gradient
/// descent on mean squared error, counting refinements.
pub(crate) struct LinearModel {
    topology: Topology,
    weights: WeightSet,
    refines: AtomicUsize,
}

impl LinearModel {
    /// A one-input, one-output model computing `slope * x + intercept`.
    pub(crate) fn with_line(slope: f32, intercept: f32) -> LinearModel {
        let mut model = LinearModel::build(Topology::new(vec![1, 1]).unwrap(), 0);
        let layer = Layer::new(LayerShape::new(1, 1), vec![slope], vec![intercept]).unwrap();
        model.set_weights(WeightSet::new(vec![layer])).unwrap();
        model
    }

    pub(crate) fn refine_calls(&self) -> usize {
        self.refines.load(Ordering::SeqCst)
    }
}

impl Clone for LinearModel {
    fn clone(&self) -> Self {
        LinearModel {
            topology: self.topology.clone(),
            weights: self.weights.clone(),
            refines: AtomicUsize::new(self.refine_calls()),
        }
    }
}

impl Model for LinearModel {
    fn build(topology: Topology, seed: u64) -> Self {
        assert_eq!(topology.layer_count(), 1, "LinearModel has a single layer");
        LinearModel {
            weights: WeightSet::random_init(&topology, &mut seeded(seed)),
            topology,
            refines: AtomicUsize::new(0),
        }
    }

    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn evaluate(&self, weights: &WeightSet, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        inputs
            .iter()
            .map(|x| weights.layers()[0].forward(x))
            .collect()
    }

    fn refine(
        &self,
        weights: &WeightSet,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        epochs: usize,
        learning_rate: f32,
    ) -> WeightSet {
        self.refines.fetch_add(1, Ordering::SeqCst);
        let mut weights = weights.clone();
        let n = inputs.len() as f32;
        for _ in 0..epochs {
            let layer = &weights.layers()[0];
            let outputs = layer.shape().outputs;
            let mut weight_grad = vec![0.0; layer.weights().len()];
            let mut bias_grad = vec![0.0; outputs];
            for (x, y) in inputs.iter().zip(targets) {
                let prediction = layer.forward(x);
                for o in 0..outputs {
                    let delta = 2.0 * (prediction[o] - y[o]) / (n * outputs as f32);
                    bias_grad[o] += delta;
                    for (i, xi) in x.iter().enumerate() {
                        weight_grad[i * outputs + o] += delta * xi;
                    }
                }
            }
            let layer = &mut weights.layers_mut()[0];
            for (w, g) in layer.weights_mut().iter_mut().zip(&weight_grad) {
                *w -= learning_rate * g;
            }
            for (b, g) in layer.biases_mut().iter_mut().zip(&bias_grad) {
                *b -= learning_rate * g;
            }
        }
        weights
    }

    fn get_weights(&self) -> WeightSet {
        self.weights.clone()
    }

    fn set_weights(&mut self, weights: WeightSet) -> Result<(), ShapeMismatch> {
        weights.conforms_to(&self.topology)?;
        self.weights = weights;
        Ok(())
    }
}

/// Five samples of `y = 2x + 1` on `[-1, 1]`.
pub(crate) fn line_data() -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let xs = [-1.0f32, -0.5, 0.0, 0.5, 1.0];
    (
        xs.iter().map(|x| vec![*x]).collect(),
        xs.iter().map(|x| vec![2.0 * x + 1.0]).collect(),
    )
}
