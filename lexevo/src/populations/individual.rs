use crate::evaluation::Evaluation;
use crate::weights::WeightSet;

use serde::{Deserialize, Serialize};

/// A candidate weight set, together with its
/// evaluation once it has been computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    weights: WeightSet,
    evaluation: Option<Evaluation>,
}

impl Individual {
    /// Wraps an unevaluated weight set.
    pub fn new(weights: WeightSet) -> Individual {
        Individual {
            weights,
            evaluation: None,
        }
    }

    /// Wraps a weight set with a known evaluation.
    pub fn with_evaluation(weights: WeightSet, evaluation: Evaluation) -> Individual {
        Individual {
            weights,
            evaluation: Some(evaluation),
        }
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Returns the individual's aggregate fitness,
    /// or `None` if it has not been evaluated.
    pub fn fitness(&self) -> Option<f32> {
        self.evaluation.as_ref().map(Evaluation::fitness)
    }

    /// Aggregate fitness for ranking, with NaN treated as
    /// worse than every number.
    pub(crate) fn ranked_fitness(&self) -> Option<f32> {
        self.fitness()
            .map(|f| if f.is_nan() { f32::INFINITY } else { f })
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    pub(crate) fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    /// Consumes the individual, returning its weights.
    pub fn into_weights(self) -> WeightSet {
        self.weights
    }
}

impl From<WeightSet> for Individual {
    fn from(weights: WeightSet) -> Self {
        Individual::new(weights)
    }
}
