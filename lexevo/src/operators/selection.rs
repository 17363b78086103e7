use super::SelectionError;
use crate::evaluation::Evaluation;
use crate::populations::Individual;
use crate::rng;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Lexicase parent selection.
///
/// Each selection event starts with the whole population as
/// candidates and walks the cases in a random order, keeping
/// only the candidates whose error on the current case is within
/// `epsilon` of the best remaining error. The event ends when a
/// single candidate remains or the cases run out, at which point
/// a survivor is picked uniformly at random.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lexicase {
    /// Tolerance above the per-case minimum error
    /// within which candidates survive a case.
    pub epsilon: f32,
}

impl Lexicase {
    /// Negative or NaN tolerances are treated as zero.
    pub fn new(epsilon: f32) -> Lexicase {
        Lexicase {
            epsilon: epsilon.max(0.0),
        }
    }

    /// Selects `count` individuals from `population`, with replacement.
    ///
    /// Events are independent and run in parallel, each with
    /// its own generator forked from `rng`.
    ///
    /// # Errors
    /// Returns an error if the population is empty, or any of its
    /// members is unevaluated or has a different number of cases.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{Evaluation, Individual, Lexicase, WeightSet};
    /// use lexevo::rng::seeded;
    ///
    /// let population: Vec<Individual> = [[0.0, 2.0], [2.0, 0.0], [3.0, 3.0]]
    ///     .iter()
    ///     .map(|cases| Individual::with_evaluation(
    ///         WeightSet::default(),
    ///         Evaluation::from_cases(cases.to_vec()),
    ///     ))
    ///     .collect();
    ///
    /// let parents = Lexicase::new(0.0).select(&population, 10, &mut seeded(7)).unwrap();
    /// assert_eq!(parents.len(), 10);
    /// // The third individual is worse on every case.
    /// assert!(parents.iter().all(|p| p.evaluation().unwrap().error(0) < 3.0));
    /// ```
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        population: &'a [Individual],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<&'a Individual>, SelectionError> {
        Ok(self
            .select_indices(population, count, rng)?
            .into_iter()
            .map(|i| &population[i])
            .collect())
    }

    /// Like [`Lexicase::select`], but returns positions
    /// in `population` instead of references.
    pub fn select_indices<R: Rng + ?Sized>(
        &self,
        population: &[Individual],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        let evaluations = evaluations(population)?;
        let case_count = evaluations[0].case_count();
        rng::fork(rng, count)
            .into_par_iter()
            .map(|mut rng| {
                let mut order: Vec<usize> = (0..case_count).collect();
                order.shuffle(&mut rng);
                self.event(&evaluations, &order, &mut rng)
            })
            .collect()
    }

    /// Runs a single selection event with the cases
    /// visited in the given `order`, returning the
    /// position of the selected individual.
    ///
    /// `order` need not cover every case.
    ///
    /// # Errors
    /// Returns an error on the same conditions as [`Lexicase::select`],
    /// or if `order` names a case that doesn't exist.
    pub fn select_with_order<R: Rng + ?Sized>(
        &self,
        population: &[Individual],
        order: &[usize],
        rng: &mut R,
    ) -> Result<usize, SelectionError> {
        let evaluations = evaluations(population)?;
        let case_count = evaluations[0].case_count();
        if let Some(&case) = order.iter().find(|c| **c >= case_count) {
            return Err(SelectionError::CaseOutOfRange { case, case_count });
        }
        self.event(&evaluations, order, rng)
    }

    fn event<R: Rng + ?Sized>(
        &self,
        evaluations: &[&Evaluation],
        order: &[usize],
        rng: &mut R,
    ) -> Result<usize, SelectionError> {
        let mut candidates: Vec<usize> = (0..evaluations.len()).collect();
        for &case in order {
            if candidates.len() <= 1 {
                break;
            }
            let best = candidates
                .iter()
                .map(|&i| evaluations[i].error(case))
                .filter(|e| !e.is_nan())
                .min_by(f32::total_cmp);
            // A case nobody has a number for can't discriminate.
            let threshold = match best {
                Some(best) => best + self.epsilon.max(0.0),
                None => continue,
            };
            candidates.retain(|&i| evaluations[i].error(case) <= threshold);
        }
        candidates
            .choose(rng)
            .copied()
            .ok_or(SelectionError::EmptySelection)
    }
}

impl Default for Lexicase {
    fn default() -> Self {
        Lexicase::new(0.0)
    }
}

/// Collects every member's evaluation, checking that they
/// all exist and share one case count.
fn evaluations(population: &[Individual]) -> Result<Vec<&Evaluation>, SelectionError> {
    let first = population.first().ok_or(SelectionError::EmptyPopulation)?;
    let expected = first
        .evaluation()
        .ok_or(SelectionError::Unevaluated { index: 0 })?
        .case_count();
    population
        .iter()
        .enumerate()
        .map(|(index, individual)| {
            let evaluation = individual
                .evaluation()
                .ok_or(SelectionError::Unevaluated { index })?;
            if evaluation.case_count() != expected {
                return Err(SelectionError::CaseCountMismatch {
                    index,
                    expected,
                    found: evaluation.case_count(),
                });
            }
            Ok(evaluation)
        })
        .collect()
}
