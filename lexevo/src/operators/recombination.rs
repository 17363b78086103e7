use super::{ArityError, RecombinationError};
use crate::populations::Individual;
use crate::weights::WeightSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How parent parameters are combined into a child's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverRule {
    /// Each parameter is copied from a parent
    /// picked uniformly at random.
    Uniform,
    /// Each parameter is the mean of the parents'.
    Arithmetic,
}

impl CrossoverRule {
    /// Combines the weights of two or more parents.
    ///
    /// # Errors
    /// Returns an error if fewer than two parents are
    /// passed, or if their shapes differ.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{CrossoverRule, Topology, WeightSet};
    /// use lexevo::rng::seeded;
    ///
    /// let topology = Topology::new(vec![2, 2]).unwrap();
    /// let zeros = WeightSet::zeros(&topology);
    /// let ones = zeros.map(|_| 1.0);
    ///
    /// let mean = CrossoverRule::Arithmetic.combine(&[&zeros, &ones], &mut seeded(0)).unwrap();
    /// assert!(mean.values().all(|v| *v == 0.5));
    ///
    /// let child = CrossoverRule::Uniform.combine(&[&zeros, &ones], &mut seeded(0)).unwrap();
    /// assert!(child.values().all(|v| *v == 0.0 || *v == 1.0));
    ///
    /// assert!(CrossoverRule::Uniform.combine(&[&zeros], &mut seeded(0)).is_err());
    /// ```
    pub fn combine<R: Rng + ?Sized>(
        &self,
        parents: &[&WeightSet],
        rng: &mut R,
    ) -> Result<WeightSet, RecombinationError> {
        if parents.len() < 2 {
            return Err(ArityError {
                found: parents.len(),
            }
            .into());
        }
        let child = match (self, parents) {
            (CrossoverRule::Uniform, [a, b]) => {
                WeightSet::elementwise_combine(a, b, |x, y| if rng.gen() { x } else { y })?
            }
            (CrossoverRule::Uniform, _) => {
                WeightSet::combine_many(parents, |column| column[rng.gen_range(0..column.len())])?
            }
            (CrossoverRule::Arithmetic, _) => WeightSet::combine_many(parents, |column| {
                column.iter().sum::<f32>() / column.len() as f32
            })?,
        };
        Ok(child)
    }
}

impl Default for CrossoverRule {
    fn default() -> Self {
        CrossoverRule::Uniform
    }
}

/// Produces a fresh, unevaluated child of `parents`.
///
/// # Errors
/// Returns an error if fewer than two parents are
/// passed, or if their shapes differ.
pub fn recombine<R: Rng + ?Sized>(
    parents: &[&Individual],
    rule: CrossoverRule,
    rng: &mut R,
) -> Result<Individual, RecombinationError> {
    let weights: Vec<&WeightSet> = parents.iter().map(|p| p.weights()).collect();
    Ok(Individual::new(rule.combine(&weights, rng)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::weights::{ShapeMismatch, Topology};

    fn topology() -> Topology {
        Topology::new(vec![3, 5, 2]).unwrap()
    }

    fn random(seed: u64) -> Individual {
        Individual::new(WeightSet::random_init(&topology(), &mut seeded(seed)))
    }

    #[test]
    fn self_crossover_is_identity() {
        let parent = random(0);
        for rule in [CrossoverRule::Uniform, CrossoverRule::Arithmetic] {
            let child = recombine(&[&parent, &parent], rule, &mut seeded(1)).unwrap();
            assert_eq!(child.weights(), parent.weights());
        }
        let child = recombine(&[&parent, &parent, &parent], CrossoverRule::Uniform, &mut seeded(1)).unwrap();
        assert_eq!(child.weights(), parent.weights());

        // The mean of three equal values can round in the last place.
        let child = recombine(&[&parent, &parent, &parent], CrossoverRule::Arithmetic, &mut seeded(1)).unwrap();
        for (c, p) in child.weights().values().zip(parent.weights().values()) {
            assert!((c - p).abs() <= 1e-6 * p.abs().max(1.0), "{} vs {}", c, p);
        }
    }

    #[test]
    fn uniform_children_take_parent_values() {
        let (a, b, c) = (random(1), random(2), random(3));
        let child = recombine(&[&a, &b, &c], CrossoverRule::Uniform, &mut seeded(0)).unwrap();
        assert_eq!(child.weights().shape(), a.weights().shape());
        let mut from = [0; 3];
        for (i, value) in child.weights().values().enumerate() {
            let sources = [&a, &b, &c].map(|p| p.weights().values().nth(i).copied());
            let parent = sources
                .iter()
                .position(|s| *s == Some(*value))
                .unwrap();
            from[parent] += 1;
        }
        assert!(from.iter().all(|n| *n > 0));
    }

    #[test]
    fn arithmetic_is_mean() {
        let (a, b) = (random(1), random(2));
        let child = recombine(&[&a, &b], CrossoverRule::Arithmetic, &mut seeded(0)).unwrap();
        for ((c, x), y) in child
            .weights()
            .values()
            .zip(a.weights().values())
            .zip(b.weights().values())
        {
            assert_eq!(*c, (x + y) / 2.0);
        }
    }

    #[test]
    fn crossover_is_deterministic() {
        let (a, b) = (random(1), random(2));
        let first = recombine(&[&a, &b], CrossoverRule::Uniform, &mut seeded(8)).unwrap();
        let second = recombine(&[&a, &b], CrossoverRule::Uniform, &mut seeded(8)).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_evaluated());
    }

    #[test]
    fn invalid_parent_sets_are_rejected() {
        let a = random(1);
        assert_eq!(
            recombine(&[&a], CrossoverRule::Uniform, &mut seeded(0)),
            Err(RecombinationError::Arity(ArityError { found: 1 }))
        );
        assert_eq!(
            recombine(&[], CrossoverRule::Arithmetic, &mut seeded(0)),
            Err(RecombinationError::Arity(ArityError { found: 0 }))
        );

        let other = Individual::new(WeightSet::zeros(&Topology::new(vec![3, 2]).unwrap()));
        assert_eq!(
            recombine(&[&a, &other], CrossoverRule::Uniform, &mut seeded(0)),
            Err(RecombinationError::Shape(ShapeMismatch::LayerCount {
                expected: 2,
                found: 1
            }))
        );
    }
}
