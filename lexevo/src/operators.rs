//! Variation and selection operators over
//! [`Individual`](crate::Individual)s.
mod errors;
mod mutation;
mod recombination;
mod selection;

pub use errors::{ArityError, RecombinationError, SelectionError};
pub use mutation::{mutate, Mutation, Noise};
pub use recombination::{recombine, CrossoverRule};
pub use selection::Lexicase;
