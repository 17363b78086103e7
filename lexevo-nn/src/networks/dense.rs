use crate::networks::{Activation, NetworkConfig};

use lexevo::rng::seeded;
use lexevo::{Model, ShapeMismatch, Topology, WeightSet};

use rand::seq::SliceRandom;
use tracing::{debug, trace};

/// A fully-connected feed-forward regressor.
///
/// Every layer computes `activation(b + xW)`, with the
/// configured hidden activation on all layers but the
/// last, which uses the output activation.
///
/// Gradient refinement is mini-batch stochastic gradient
/// descent on the mean squared error. Example order is
/// shuffled from the network's seed, so refining the same
/// weights twice gives the same result.
#[derive(Clone, Debug)]
pub struct DenseNetwork {
    topology: Topology,
    config: NetworkConfig,
    seed: u64,
    weights: WeightSet,
}

/// Per-layer pre-activations and activations
/// recorded during a forward pass.
struct Trace {
    /// `activations[0]` holds the inputs.
    activations: Vec<Vec<f32>>,
    pre_activations: Vec<Vec<f32>>,
}

impl DenseNetwork {
    /// Builds a network with randomly initialized weights.
    ///
    /// # Examples
    /// ```
    /// use lexevo::Topology;
    /// use lexevo_nn::{Activation, DenseNetwork, NetworkConfig};
    ///
    /// let config = NetworkConfig {
    ///     hidden_activation: Activation::ReLU,
    ///     ..NetworkConfig::regressor()
    /// };
    /// let network = DenseNetwork::with_config(Topology::new(vec![3, 8, 2]).unwrap(), config, 1);
    /// assert_eq!(network.weights().len(), 3 * 8 + 8 + 8 * 2 + 2);
    /// ```
    pub fn with_config(topology: Topology, config: NetworkConfig, seed: u64) -> DenseNetwork {
        let weights = WeightSet::random_init(&topology, &mut seeded(seed));
        DenseNetwork {
            topology,
            config,
            seed,
            weights,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The network's own weights.
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    fn activation(&self, layer: usize) -> Activation {
        if layer + 1 == self.topology.layer_count() {
            self.config.output_activation
        } else {
            self.config.hidden_activation
        }
    }

    fn forward(&self, weights: &WeightSet, input: &[f32]) -> Vec<f32> {
        weights
            .layers()
            .iter()
            .enumerate()
            .fold(input.to_vec(), |x, (l, layer)| {
                let activation = self.activation(l);
                layer.forward(&x).into_iter().map(|z| activation.apply(z)).collect()
            })
    }

    fn trace(&self, weights: &WeightSet, input: &[f32]) -> Trace {
        let mut trace = Trace {
            activations: vec![input.to_vec()],
            pre_activations: Vec::with_capacity(weights.layers().len()),
        };
        for (l, layer) in weights.layers().iter().enumerate() {
            let activation = self.activation(l);
            let z = layer.forward(&trace.activations[l]);
            trace.activations.push(z.iter().map(|z| activation.apply(*z)).collect());
            trace.pre_activations.push(z);
        }
        trace
    }

    /// Adds the gradient of the squared error of one example,
    /// averaged over outputs, to `gradient`.
    fn backpropagate(&self, weights: &WeightSet, input: &[f32], target: &[f32], gradient: &mut WeightSet) {
        let trace = self.trace(weights, input);
        let last = weights.layers().len() - 1;
        let outputs = &trace.activations[last + 1];
        let scale = 2.0 / outputs.len() as f32;
        let mut delta: Vec<f32> = outputs
            .iter()
            .zip(target)
            .zip(&trace.pre_activations[last])
            .map(|((a, y), z)| scale * (a - y) * self.activation(last).derivative(*z))
            .collect();

        for l in (0..=last).rev() {
            let layer = &weights.layers()[l];
            let width = layer.shape().outputs;
            let grad = &mut gradient.layers_mut()[l];
            for (g, d) in grad.biases_mut().iter_mut().zip(&delta) {
                *g += d;
            }
            for (row, x) in grad
                .weights_mut()
                .chunks_mut(width)
                .zip(&trace.activations[l])
            {
                for (g, d) in row.iter_mut().zip(&delta) {
                    *g += x * d;
                }
            }
            if l > 0 {
                let activation = self.activation(l - 1);
                delta = layer
                    .weights()
                    .chunks(width)
                    .zip(&trace.pre_activations[l - 1])
                    .map(|(row, z)| {
                        row.iter().zip(&delta).map(|(w, d)| w * d).sum::<f32>()
                            * activation.derivative(*z)
                    })
                    .collect();
            }
        }
    }

    /// Mean over examples of the output-averaged squared error.
    pub fn loss(&self, weights: &WeightSet, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> f32 {
        let total: f32 = inputs
            .iter()
            .zip(targets)
            .map(|(x, y)| {
                let prediction = self.forward(weights, x);
                prediction
                    .iter()
                    .zip(y)
                    .map(|(p, t)| (p - t).powi(2))
                    .sum::<f32>()
                    / y.len().max(1) as f32
            })
            .sum();
        total / inputs.len().max(1) as f32
    }

    /// Trains the network's own weights by gradient descent.
    /// This is plain training, with no evolution involved.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{Model, Topology};
    /// use lexevo_nn::DenseNetwork;
    ///
    /// let inputs: Vec<Vec<f32>> = (0..16).map(|i| vec![i as f32 / 16.0]).collect();
    /// let targets: Vec<Vec<f32>> = inputs.iter().map(|x| vec![0.5 * x[0] - 0.25]).collect();
    ///
    /// let mut network = DenseNetwork::build(Topology::new(vec![1, 4, 1]).unwrap(), 3);
    /// let before = network.loss(network.weights(), &inputs, &targets);
    /// network.train(&inputs, &targets, 50, 0.1);
    /// assert!(network.loss(network.weights(), &inputs, &targets) < before);
    /// ```
    pub fn train(&mut self, inputs: &[Vec<f32>], targets: &[Vec<f32>], epochs: usize, learning_rate: f32) {
        self.weights = self.refine(&self.weights, inputs, targets, epochs, learning_rate);
        debug!(
            epochs,
            loss = self.loss(&self.weights, inputs, targets),
            "network trained"
        );
    }
}

impl Model for DenseNetwork {
    fn build(topology: Topology, seed: u64) -> Self {
        DenseNetwork::with_config(topology, NetworkConfig::default(), seed)
    }

    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn evaluate(&self, weights: &WeightSet, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        inputs.iter().map(|x| self.forward(weights, x)).collect()
    }

    fn refine(
        &self,
        weights: &WeightSet,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
        epochs: usize,
        learning_rate: f32,
    ) -> WeightSet {
        let mut weights = weights.clone();
        let mut rng = seeded(self.seed);
        let mut order: Vec<usize> = (0..inputs.len().min(targets.len())).collect();
        for epoch in 0..epochs {
            if self.config.shuffle {
                order.shuffle(&mut rng);
            }
            for batch in order.chunks(self.config.batch_size.get()) {
                let mut gradient = WeightSet::zeros(&self.topology);
                for &i in batch {
                    self.backpropagate(&weights, &inputs[i], &targets[i], &mut gradient);
                }
                let step = learning_rate / batch.len() as f32;
                for (w, g) in weights.values_mut().zip(gradient.values()) {
                    *w -= step * g;
                }
            }
            trace!(epoch, "refinement epoch complete");
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn data() -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let inputs: Vec<Vec<f32>> = (0..20)
            .map(|i| {
                let x = i as f32 / 10.0 - 1.0;
                vec![x, x * x]
            })
            .collect();
        let targets = inputs
            .iter()
            .map(|x| vec![x[0] + x[1], 0.5 * x[0]])
            .collect();
        (inputs, targets)
    }

    fn network(hidden: Activation, output: Activation) -> DenseNetwork {
        DenseNetwork::with_config(
            Topology::new(vec![2, 5, 3, 2]).unwrap(),
            NetworkConfig {
                hidden_activation: hidden,
                output_activation: output,
                ..NetworkConfig::regressor()
            },
            7,
        )
    }

    #[test]
    fn zero_weights_output_activated_biases() {
        let mut net = network(Activation::Tanh, Activation::Sigmoid);
        net.set_weights(WeightSet::zeros(net.topology())).unwrap();
        let predictions = net.predict(&[vec![3.0, -1.0], vec![0.0, 0.0]]);
        assert_eq!(predictions, vec![vec![0.5, 0.5], vec![0.5, 0.5]]);
    }

    #[test]
    fn backpropagation_matches_finite_differences() {
        const H: f32 = 1e-2;
        let net = network(Activation::Tanh, Activation::Identity);
        let weights = net.get_weights().map(|w| w * 2.0);
        let (inputs, targets) = data();
        let (x, y) = (&inputs[3], &targets[3]);

        let mut gradient = WeightSet::zeros(net.topology());
        net.backpropagate(&weights, x, y, &mut gradient);

        let loss = |w: &WeightSet| net.loss(w, &[x.clone()], &[y.clone()]);
        for (k, analytic) in gradient.values().enumerate() {
            let nudged = |delta: f32| {
                let mut w = weights.clone();
                if let Some(v) = w.values_mut().nth(k) {
                    *v += delta;
                }
                w
            };
            let numeric = (loss(&nudged(H)) - loss(&nudged(-H))) / (2.0 * H);
            assert!(
                (numeric - analytic).abs() < 1e-2 + 0.05 * analytic.abs(),
                "parameter {}: {} vs {}",
                k,
                numeric,
                analytic
            );
        }
    }

    #[test]
    fn refinement_reduces_loss() {
        let net = network(Activation::Tanh, Activation::Identity);
        let (inputs, targets) = data();
        let before = net.get_weights();
        let after = net.refine(&before, &inputs, &targets, 200, 0.1);
        assert!(net.loss(&after, &inputs, &targets) < net.loss(&before, &inputs, &targets) / 2.0);
        assert_eq!(net.get_weights(), before);
    }

    #[test]
    fn refinement_is_deterministic() {
        let net = DenseNetwork::with_config(
            Topology::new(vec![2, 4, 2]).unwrap(),
            NetworkConfig {
                batch_size: NonZeroUsize::new(3).unwrap(),
                ..NetworkConfig::regressor()
            },
            11,
        );
        let (inputs, targets) = data();
        let weights = net.get_weights();
        assert_eq!(
            net.refine(&weights, &inputs, &targets, 5, 0.05),
            net.refine(&weights, &inputs, &targets, 5, 0.05)
        );
        assert_eq!(net.refine(&weights, &inputs, &targets, 0, 0.05), weights);
    }

    #[test]
    fn training_updates_own_weights() {
        let mut net = network(Activation::ReLU, Activation::Identity);
        let (inputs, targets) = data();
        let before = net.get_weights();
        net.train(&inputs, &targets, 10, 0.05);
        assert_ne!(net.get_weights(), before);
        assert!(net.get_weights().conforms_to(net.topology()).is_ok());
    }

    #[test]
    fn foreign_weights_are_rejected() {
        let mut net = network(Activation::Tanh, Activation::Identity);
        let other = WeightSet::zeros(&Topology::new(vec![2, 5, 2]).unwrap());
        assert!(net.set_weights(other).is_err());
        assert!(net.set_weights(WeightSet::zeros(&Topology::new(vec![2, 5, 3, 2]).unwrap())).is_ok());
    }
}
