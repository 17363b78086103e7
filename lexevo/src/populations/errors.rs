use crate::operators::{ArityError, RecombinationError, SelectionError};
use crate::weights::ShapeMismatch;

use thiserror::Error;

/// Invalid engine hyperparameters.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("population size must be greater than zero")]
    ZeroPopulation,
    #[error("generation count must be greater than zero")]
    ZeroGenerations,
    #[error("selection size must be in 1..={population_size}, got {selection_size}")]
    SelectionSize {
        selection_size: usize,
        population_size: usize,
    },
    #[error("learning rate must be finite and non-negative, got {0}")]
    LearningRate(f32),
    #[error("at least one error metric must be configured")]
    NoCases,
    #[error("unknown error metric {0:?}")]
    UnknownMetric(String),
    #[error("{name} is a probability and must lie in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("{name} must be finite and non-negative, got {value}")]
    NonNegative { name: &'static str, value: f32 },
    #[error("expected {expected} seed weight sets, got {found}")]
    SeedCount { expected: usize, found: usize },
}

/// Training data that cannot be evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("training data is empty")]
    Empty,
    #[error("{inputs} input rows but {targets} target rows")]
    LengthMismatch { inputs: usize, targets: usize },
    #[error("input row {example} has width {found}, expected {expected}")]
    InputWidth {
        example: usize,
        expected: usize,
        found: usize,
    },
    #[error("target row {example} has width {found}, expected {expected}")]
    TargetWidth {
        example: usize,
        expected: usize,
        found: usize,
    },
    #[error("model returned {found} predictions for {expected} examples")]
    PredictionCount { expected: usize, found: usize },
}

/// Any error aborting an evolutionary run.
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Shape(#[from] ShapeMismatch),
    #[error(transparent)]
    Arity(#[from] ArityError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("no individual has been evaluated yet")]
    Unevaluated,
}

impl From<RecombinationError> for EvolutionError {
    fn from(error: RecombinationError) -> Self {
        match error {
            RecombinationError::Arity(e) => EvolutionError::Arity(e),
            RecombinationError::Shape(e) => EvolutionError::Shape(e),
        }
    }
}
