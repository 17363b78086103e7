//! A Population is a collection of candidate weight sets,
//! which can be evolved by an [`EvolutionEngine`] using
//! per-case training errors as the source of selective
//! pressure.
mod config;
mod engine;
mod errors;
mod individual;
pub mod logging;

pub use config::{EngineConfig, HybridPolicy};
pub use engine::{EngineState, EvolutionEngine};
pub use errors::{ConfigurationError, DataError, EvolutionError};
pub use individual::Individual;

use crate::weights::{Topology, WeightSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::ops::Index;

/// An ordered collection of individuals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates a population of `size` randomly
    /// initialized, unevaluated individuals.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{Population, Topology};
    /// use lexevo::rng::seeded;
    ///
    /// let topology = Topology::new(vec![2, 3, 1]).unwrap();
    /// let population = Population::random(&topology, 10, &mut seeded(0));
    ///
    /// assert_eq!(population.len(), 10);
    /// assert!(population.iter().all(|i| !i.is_evaluated()));
    /// assert!(population.champion().is_none());
    /// ```
    pub fn random<R: Rng + ?Sized>(topology: &Topology, size: usize, rng: &mut R) -> Population {
        Population {
            individuals: (0..size)
                .map(|_| Individual::new(WeightSet::random_init(topology, rng)))
                .collect(),
        }
    }

    /// Creates a population of unevaluated individuals
    /// holding the given weights.
    pub fn from_weights(weights: Vec<WeightSet>) -> Population {
        weights.into_iter().map(Individual::new).collect()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Iterate over the population's members.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Returns the evaluated individual with the lowest
    /// aggregate fitness, or `None` if nobody has been
    /// evaluated. Ties go to the earliest member, and a NaN
    /// fitness counts as worse than any number.
    pub fn champion(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter_map(|i| i.ranked_fitness().map(|f| (i, f)))
            .reduce(|best, next| if next.1.total_cmp(&best.1).is_lt() { next } else { best })
            .map(|(i, _)| i)
    }
}

impl Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Population {
            individuals: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluation;
    use crate::rng::seeded;

    #[test]
    fn random_populations_conform() {
        let topology = Topology::new(vec![3, 4, 2]).unwrap();
        let population = Population::random(&topology, 7, &mut seeded(1));
        assert_eq!(population.len(), 7);
        assert!(population
            .iter()
            .all(|i| i.weights().conforms_to(&topology).is_ok()));
        assert_ne!(population[0], population[1]);
    }

    #[test]
    fn champion_has_lowest_fitness() {
        let mut population = Population::from_weights(vec![WeightSet::default(); 4]);
        assert!(population.champion().is_none());

        for (individual, fitness) in population.individuals_mut().iter_mut().zip([3.0, 1.0, 2.0]) {
            individual.set_evaluation(Evaluation::from_cases(vec![fitness]));
        }
        assert_eq!(population.champion().and_then(Individual::fitness), Some(1.0));
        assert_eq!(population.iter().filter(|i| i.is_evaluated()).count(), 3);
    }

    #[test]
    fn champion_ties_go_to_first() {
        let population: Population = (0..3)
            .map(|n| {
                let topology = Topology::new(vec![1, n + 1]).unwrap();
                Individual::with_evaluation(
                    WeightSet::zeros(&topology),
                    Evaluation::from_cases(vec![0.5]),
                )
            })
            .collect();
        assert_eq!(population.champion(), Some(&population[0]));
    }

    #[test]
    fn nan_fitness_never_wins() {
        let nan = -f32::NAN;
        assert!(nan.is_sign_negative());
        let population: Population = [nan, 4.0, f32::NAN, 2.0]
            .into_iter()
            .map(|f| Individual::with_evaluation(WeightSet::default(), Evaluation::from_cases(vec![f])))
            .collect();
        assert_eq!(population.champion(), Some(&population[3]));

        let only_nan: Population = vec![population[0].clone()].into_iter().collect();
        assert!(only_nan.champion().is_some());
    }
}
