//! Weight sets are the unit of evolution.
//! A weight set holds every trainable parameter of a
//! fixed-topology feed-forward network: one weight matrix
//! and one bias vector per layer. Every genetic operator
//! consumes and produces whole weight sets.

mod errors;
mod topology;

pub use errors::{ShapeMismatch, TopologyError};
pub use topology::{LayerShape, Topology};

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Initial value of every bias.
pub const INITIAL_BIAS: f32 = 1.0;

/// The weights and biases of a single trainable layer.
///
/// Weights are stored row-major by input, so the weight
/// connecting input `i` to output `o` sits at `i * outputs + o`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Layer {
    shape: LayerShape,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Builds a layer from its buffers.
    ///
    /// # Errors
    /// Returns an error if the buffer lengths do not fit `shape`.
    ///
    /// # Examples
    /// ```
    /// use lexevo::weights::{Layer, LayerShape};
    ///
    /// let layer = Layer::new(LayerShape::new(2, 1), vec![0.5, -1.0], vec![2.0]).unwrap();
    /// assert_eq!(layer.weight(1, 0), -1.0);
    /// assert_eq!(layer.forward(&[2.0, 1.0]), vec![2.0]);
    ///
    /// assert!(Layer::new(LayerShape::new(2, 1), vec![0.5], vec![2.0]).is_err());
    /// ```
    pub fn new(
        shape: LayerShape,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Layer, ShapeMismatch> {
        if weights.len() != shape.weight_count() || biases.len() != shape.outputs {
            return Err(ShapeMismatch::Buffer {
                shape,
                weights: weights.len(),
                biases: biases.len(),
            });
        }
        Ok(Layer {
            shape,
            weights,
            biases,
        })
    }

    /// A layer with all parameters set to zero.
    pub fn zeros(shape: LayerShape) -> Layer {
        Layer {
            shape,
            weights: vec![0.0; shape.weight_count()],
            biases: vec![0.0; shape.outputs],
        }
    }

    /// Fan-in initialization: weights are drawn uniformly from
    /// `[-0.5 / inputs, 0.5 / inputs]` and biases start at
    /// [`INITIAL_BIAS`].
    fn fan_in<R: Rng + ?Sized>(shape: LayerShape, rng: &mut R) -> Layer {
        let bound = 0.5 / shape.inputs as f32;
        let distribution = Uniform::new_inclusive(-bound, bound);
        Layer {
            shape,
            weights: (0..shape.weight_count())
                .map(|_| distribution.sample(rng))
                .collect(),
            biases: vec![INITIAL_BIAS; shape.outputs],
        }
    }

    /// Returns the layer's dimensions.
    pub fn shape(&self) -> LayerShape {
        self.shape
    }

    /// Returns the weight connecting `input` to `output`.
    pub fn weight(&self, input: usize, output: usize) -> f32 {
        self.weights[input * self.shape.outputs + output]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Iterates over every scalar, weights before biases.
    pub fn values(&self) -> impl Iterator<Item = &f32> {
        self.weights.iter().chain(self.biases.iter())
    }

    /// Mutable counterpart of [`Layer::values`].
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.weights.iter_mut().chain(self.biases.iter_mut())
    }

    /// Applies the layer's affine transform, `b + xW`, without
    /// any activation.
    ///
    /// Extra inputs beyond the layer's width are ignored.
    pub fn forward(&self, inputs: &[f32]) -> Vec<f32> {
        let mut outputs = self.biases.clone();
        for (row, x) in self.weights.chunks(self.shape.outputs).zip(inputs) {
            for (out, w) in outputs.iter_mut().zip(row) {
                *out += x * w;
            }
        }
        outputs
    }

    fn map<F: FnMut(f32) -> f32>(&self, mut f: F) -> Layer {
        Layer {
            shape: self.shape,
            weights: self.weights.iter().map(|w| f(*w)).collect(),
            biases: self.biases.iter().map(|b| f(*b)).collect(),
        }
    }
}

/// The full collection of a network's trainable parameters,
/// one [`Layer`] per trainable layer of its [`Topology`].
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct WeightSet {
    layers: Vec<Layer>,
}

impl WeightSet {
    /// Wraps already-built layers.
    pub fn new(layers: Vec<Layer>) -> WeightSet {
        WeightSet { layers }
    }

    /// Returns a randomly initialized weight set for `topology`.
    ///
    /// For a layer with `N` inputs, weights are drawn uniformly
    /// from `[-0.5/N, 0.5/N]`; all biases are set to `1.0`.
    ///
    /// # Examples
    /// ```
    /// use lexevo::weights::{Topology, WeightSet};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let topology = Topology::new(vec![4, 10, 1]).unwrap();
    /// let weights = WeightSet::random_init(&topology, &mut ChaCha8Rng::seed_from_u64(42));
    ///
    /// assert!(weights.conforms_to(&topology).is_ok());
    /// assert!(weights.layers()[0].weights().iter().all(|w| w.abs() <= 0.5 / 4.0));
    /// assert!(weights.layers()[1].weights().iter().all(|w| w.abs() <= 0.5 / 10.0));
    /// assert!(weights.layers().iter().all(|l| l.biases().iter().all(|b| *b == 1.0)));
    /// ```
    pub fn random_init<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> WeightSet {
        WeightSet {
            layers: topology
                .shapes()
                .map(|shape| Layer::fan_in(shape, rng))
                .collect(),
        }
    }

    /// A weight set for `topology` with every parameter at zero.
    pub fn zeros(topology: &Topology) -> WeightSet {
        WeightSet {
            layers: topology.shapes().map(Layer::zeros).collect(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Returns the shape of every layer.
    pub fn shape(&self) -> Vec<LayerShape> {
        self.layers.iter().map(Layer::shape).collect()
    }

    /// Total number of scalar parameters.
    pub fn len(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every scalar parameter, layer by layer.
    pub fn values(&self) -> impl Iterator<Item = &f32> {
        self.layers.iter().flat_map(Layer::values)
    }

    /// Mutable counterpart of [`WeightSet::values`].
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.layers.iter_mut().flat_map(Layer::values_mut)
    }

    /// Checks that the weight set has exactly the layers `topology` describes.
    pub fn conforms_to(&self, topology: &Topology) -> Result<(), ShapeMismatch> {
        Self::compare_shapes(topology.shapes(), self.layers.iter().map(Layer::shape))
    }

    /// Checks that `self` and `other` have identical shapes.
    pub fn check_compatible(&self, other: &WeightSet) -> Result<(), ShapeMismatch> {
        Self::compare_shapes(
            self.layers.iter().map(Layer::shape),
            other.layers.iter().map(Layer::shape),
        )
    }

    fn compare_shapes(
        expected: impl ExactSizeIterator<Item = LayerShape>,
        found: impl ExactSizeIterator<Item = LayerShape>,
    ) -> Result<(), ShapeMismatch> {
        if expected.len() != found.len() {
            return Err(ShapeMismatch::LayerCount {
                expected: expected.len(),
                found: found.len(),
            });
        }
        for (layer, (expected, found)) in expected.zip(found).enumerate() {
            if expected != found {
                return Err(ShapeMismatch::Layer {
                    layer,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Returns a new weight set with `f` applied to every parameter.
    pub fn map<F: FnMut(f32) -> f32>(&self, mut f: F) -> WeightSet {
        WeightSet {
            layers: self.layers.iter().map(|l| l.map(&mut f)).collect(),
        }
    }

    /// Applies `f` to paired entries of two weight sets.
    ///
    /// # Errors
    /// Returns an error if the weight sets have different shapes.
    ///
    /// # Examples
    /// ```
    /// use lexevo::weights::{Topology, WeightSet};
    ///
    /// let topology = Topology::new(vec![2, 1]).unwrap();
    /// let ones = WeightSet::zeros(&topology).map(|_| 1.0);
    /// let twos = ones.map(|w| w * 2.0);
    ///
    /// let sum = WeightSet::elementwise_combine(&ones, &twos, |a, b| a + b).unwrap();
    /// assert!(sum.values().all(|v| *v == 3.0));
    ///
    /// let other = WeightSet::zeros(&Topology::new(vec![3, 1]).unwrap());
    /// assert!(WeightSet::elementwise_combine(&ones, &other, |a, _| a).is_err());
    /// ```
    pub fn elementwise_combine<F>(
        a: &WeightSet,
        b: &WeightSet,
        mut f: F,
    ) -> Result<WeightSet, ShapeMismatch>
    where
        F: FnMut(f32, f32) -> f32,
    {
        a.check_compatible(b)?;
        let layers = a
            .layers
            .iter()
            .zip(&b.layers)
            .map(|(la, lb)| Layer {
                shape: la.shape,
                weights: la
                    .weights
                    .iter()
                    .zip(&lb.weights)
                    .map(|(x, y)| f(*x, *y))
                    .collect(),
                biases: la
                    .biases
                    .iter()
                    .zip(&lb.biases)
                    .map(|(x, y)| f(*x, *y))
                    .collect(),
            })
            .collect();
        Ok(WeightSet { layers })
    }

    /// Generalization of [`WeightSet::elementwise_combine`] to any number
    /// of weight sets: `f` receives the corresponding entry of every
    /// parent, in the order given.
    ///
    /// Combining no weight sets yields an empty weight set.
    ///
    /// # Errors
    /// Returns an error if the weight sets have different shapes.
    pub fn combine_many<F>(parents: &[&WeightSet], mut f: F) -> Result<WeightSet, ShapeMismatch>
    where
        F: FnMut(&[f32]) -> f32,
    {
        let first = match parents.first() {
            Some(first) => *first,
            None => return Ok(WeightSet::default()),
        };
        for other in &parents[1..] {
            first.check_compatible(other)?;
        }

        let mut column = Vec::with_capacity(parents.len());
        let mut layers = Vec::with_capacity(first.layers.len());
        for (l, layer) in first.layers.iter().enumerate() {
            let mut weights = Vec::with_capacity(layer.weights.len());
            for i in 0..layer.weights.len() {
                column.clear();
                column.extend(parents.iter().map(|p| p.layers[l].weights[i]));
                weights.push(f(&column));
            }
            let mut biases = Vec::with_capacity(layer.biases.len());
            for i in 0..layer.biases.len() {
                column.clear();
                column.extend(parents.iter().map(|p| p.layers[l].biases[i]));
                biases.push(f(&column));
            }
            layers.push(Layer {
                shape: layer.shape,
                weights,
                biases,
            });
        }
        Ok(WeightSet { layers })
    }
}

impl fmt::Display for WeightSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shapes: Vec<String> = self.layers.iter().map(|l| l.shape.to_string()).collect();
        write!(f, "WeightSet[{}]", shapes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;

    fn topology() -> Topology {
        Topology::new(vec![3, 4, 2]).unwrap()
    }

    #[test]
    fn random_init_matches_topology() {
        for sizes in [vec![1, 1], vec![3, 4, 2], vec![7, 5, 5, 1]] {
            let topology = Topology::new(sizes).unwrap();
            let weights = WeightSet::random_init(&topology, &mut rng::seeded(7));
            assert_eq!(weights.shape(), topology.shapes().collect::<Vec<_>>());
            assert!(weights.conforms_to(&topology).is_ok());
            for layer in weights.layers() {
                let bound = 0.5 / layer.shape().inputs as f32;
                assert!(layer.weights().iter().all(|w| (-bound..=bound).contains(w)));
                assert!(layer.biases().iter().all(|b| *b == INITIAL_BIAS));
            }
        }
    }

    #[test]
    fn random_init_is_seeded() {
        let a = WeightSet::random_init(&topology(), &mut rng::seeded(3));
        let b = WeightSet::random_init(&topology(), &mut rng::seeded(3));
        let c = WeightSet::random_init(&topology(), &mut rng::seeded(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn len_counts_weights_and_biases() {
        let weights = WeightSet::zeros(&topology());
        assert_eq!(weights.len(), 3 * 4 + 4 + 4 * 2 + 2);
        assert_eq!(weights.values().count(), weights.len());
    }

    #[test]
    fn conforms_to_reports_mismatch() {
        let weights = WeightSet::zeros(&topology());
        assert_eq!(
            weights.conforms_to(&Topology::new(vec![3, 4]).unwrap()),
            Err(ShapeMismatch::LayerCount {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            weights.conforms_to(&Topology::new(vec![3, 5, 2]).unwrap()),
            Err(ShapeMismatch::Layer {
                layer: 0,
                expected: LayerShape::new(3, 5),
                found: LayerShape::new(3, 4),
            })
        );
    }

    #[test]
    fn combine_many_sees_parents_in_order() {
        let topology = topology();
        let a = WeightSet::zeros(&topology);
        let b = a.map(|_| 1.0);
        let c = a.map(|_| 2.0);
        let combined = WeightSet::combine_many(&[&a, &b, &c], |column| {
            assert_eq!(column.to_vec(), vec![0.0f32, 1.0, 2.0]);
            column.iter().sum()
        })
        .unwrap();
        assert!(combined.values().all(|v| *v == 3.0));
        assert_eq!(combined.shape(), a.shape());
    }

    #[test]
    fn combine_many_rejects_mismatched_parents() {
        let a = WeightSet::zeros(&topology());
        let b = WeightSet::zeros(&Topology::new(vec![3, 4, 1]).unwrap());
        assert!(WeightSet::combine_many(&[&a, &b], |c| c[0]).is_err());
        assert!(WeightSet::combine_many(&[], |c| c[0]).unwrap().is_empty());
    }

    #[test]
    fn forward_applies_affine_transform() {
        let layer = Layer::new(
            LayerShape::new(2, 2),
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0.5, -0.5],
        )
        .unwrap();
        assert_eq!(layer.forward(&[1.0, 1.0]), vec![4.5, 5.5]);
        assert_eq!(layer.weight(1, 0), 3.0);
    }
}
