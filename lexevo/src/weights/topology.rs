use super::TopologyError;

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt;

/// Dimensions of a single trainable layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerShape {
    /// Number of values feeding into the layer.
    pub inputs: usize,
    /// Number of values the layer produces.
    pub outputs: usize,
}

impl LayerShape {
    /// Returns a new layer shape.
    pub const fn new(inputs: usize, outputs: usize) -> LayerShape {
        LayerShape { inputs, outputs }
    }

    /// Number of entries in the layer's weight matrix.
    pub const fn weight_count(&self) -> usize {
        self.inputs * self.outputs
    }
}

impl fmt::Display for LayerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.inputs, self.outputs)
    }
}

/// The fixed layer sizes of a feed-forward network,
/// from the input layer to the output layer.
///
/// Every pair of consecutive sizes describes one
/// trainable layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    /// Creates a topology from its layer sizes.
    ///
    /// # Errors
    /// Returns an error if fewer than two sizes are given,
    /// or if any layer is empty.
    ///
    /// # Examples
    /// ```
    /// use lexevo::weights::{LayerShape, Topology};
    ///
    /// let topology = Topology::new(vec![3, 5, 1]).unwrap();
    /// assert_eq!(topology.input_count(), 3);
    /// assert_eq!(topology.output_count(), 1);
    /// assert_eq!(
    ///     topology.shapes().collect::<Vec<_>>(),
    ///     vec![LayerShape::new(3, 5), LayerShape::new(5, 1)]
    /// );
    ///
    /// assert!(Topology::new(vec![3]).is_err());
    /// assert!(Topology::new(vec![3, 0, 1]).is_err());
    /// ```
    pub fn new(sizes: Vec<usize>) -> Result<Topology, TopologyError> {
        if sizes.len() < 2 {
            return Err(TopologyError::TooFewLayers(sizes.len()));
        }
        if let Some(index) = sizes.iter().position(|s| *s == 0) {
            return Err(TopologyError::EmptyLayer(index));
        }
        Ok(Topology { sizes })
    }

    /// Shorthand for a network with a single hidden layer.
    pub fn single_hidden(
        inputs: usize,
        hidden: usize,
        outputs: usize,
    ) -> Result<Topology, TopologyError> {
        Topology::new(vec![inputs, hidden, outputs])
    }

    /// Number of network inputs.
    pub fn input_count(&self) -> usize {
        self.sizes[0]
    }

    /// Number of network outputs.
    pub fn output_count(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Number of trainable layers.
    pub fn layer_count(&self) -> usize {
        self.sizes.len() - 1
    }

    /// All layer sizes, inputs first.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Iterates over the shapes of every trainable layer.
    pub fn shapes(&self) -> impl ExactSizeIterator<Item = LayerShape> + '_ {
        self.sizes
            .windows(2)
            .map(|pair| LayerShape::new(pair[0], pair[1]))
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = TopologyError;

    fn try_from(sizes: Vec<usize>) -> Result<Self, Self::Error> {
        Topology::new(sizes)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Self {
        topology.sizes
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<String> = self.sizes.iter().map(usize::to_string).collect();
        write!(f, "{}", sizes.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_sizes() {
        let topology = Topology::new(vec![4, 8, 2, 1]).unwrap();
        let shapes: Vec<LayerShape> = topology.shapes().collect();
        assert_eq!(topology.layer_count(), 3);
        assert_eq!(topology.shapes().len(), 3);
        assert_eq!(
            shapes,
            vec![
                LayerShape::new(4, 8),
                LayerShape::new(8, 2),
                LayerShape::new(2, 1)
            ]
        );
        assert_eq!(shapes[0].weight_count(), 32);
    }

    #[test]
    fn rejects_degenerate_topologies() {
        assert_eq!(Topology::new(vec![]), Err(TopologyError::TooFewLayers(0)));
        assert_eq!(Topology::new(vec![2]), Err(TopologyError::TooFewLayers(1)));
        assert_eq!(Topology::new(vec![2, 3, 0]), Err(TopologyError::EmptyLayer(2)));
    }

    #[test]
    fn deserialization_is_validated() {
        let topology: Topology = serde_json::from_str("[2, 5, 1]").unwrap();
        assert_eq!(topology.to_string(), "2-5-1");
        assert!(serde_json::from_str::<Topology>("[2]").is_err());
        assert_eq!(serde_json::to_string(&topology).unwrap(), "[2,5,1]");
    }
}
