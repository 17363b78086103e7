use crate::weights::ShapeMismatch;

use thiserror::Error;

/// Recombination was attempted with fewer than two parents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("recombination requires at least 2 parents, got {found}")]
pub struct ArityError {
    pub found: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecombinationError {
    #[error(transparent)]
    Arity(#[from] ArityError),
    #[error(transparent)]
    Shape(#[from] ShapeMismatch),
}

/// Lexicase selection could not run, or produced no candidate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("cannot select from an empty population")]
    EmptyPopulation,
    #[error("individual {index} has not been evaluated")]
    Unevaluated { index: usize },
    #[error("individual {index} has {found} cases, expected {expected}")]
    CaseCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("case {case} is out of range for {case_count} cases")]
    CaseOutOfRange { case: usize, case_count: usize },
    #[error("lexicase filtering left no candidates")]
    EmptySelection,
}
