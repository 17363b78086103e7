use super::LayerShape;

use thiserror::Error;

/// An error type indicating an invalid network topology.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Fewer than an input and an output layer were given.
    #[error("topology needs at least 2 layer sizes, got {0}")]
    TooFewLayers(usize),
    /// The layer at the given position has no units.
    #[error("layer {0} of topology is empty")]
    EmptyLayer(usize),
}

/// An error type indicating that weight tensors do not
/// share the same shape.
///
/// Weight sets within a population always share the
/// shape of the model's topology, so this error points
/// to a caller or topology bug.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    /// The number of layers differs.
    #[error("expected {expected} layers, found {found}")]
    LayerCount { expected: usize, found: usize },
    /// A layer's dimensions differ.
    #[error("layer {layer} has shape {found}, expected {expected}")]
    Layer {
        layer: usize,
        expected: LayerShape,
        found: LayerShape,
    },
    /// A layer's buffers do not fit its declared shape.
    #[error("layer of shape {shape} given {weights} weights and {biases} biases")]
    Buffer {
        shape: LayerShape,
        weights: usize,
        biases: usize,
    },
}
