use crate::populations::Individual;
use crate::rng::chance;
use crate::weights::WeightSet;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Distribution of the perturbation added to a mutated parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Noise {
    /// Normally distributed, with the magnitude
    /// as standard deviation.
    Gaussian,
    /// Uniformly distributed in `[-magnitude, magnitude]`.
    Uniform,
}

/// Per-parameter weight perturbation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Chance that any single parameter is perturbed.
    pub rate: f32,
    /// Scale of the perturbation.
    pub magnitude: f32,
    pub noise: Noise,
}

impl Mutation {
    pub fn new(rate: f32, magnitude: f32, noise: Noise) -> Mutation {
        Mutation {
            rate,
            magnitude,
            noise,
        }
    }

    /// Returns a perturbed copy of `weights`.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{Mutation, Noise, Topology, WeightSet};
    /// use lexevo::rng::seeded;
    ///
    /// let topology = Topology::new(vec![3, 4, 1]).unwrap();
    /// let weights = WeightSet::random_init(&topology, &mut seeded(0));
    ///
    /// let mutant = Mutation::new(1.0, 0.1, Noise::Uniform).apply(&weights, &mut seeded(1));
    /// assert_eq!(mutant.shape(), weights.shape());
    /// assert!(mutant.values().zip(weights.values()).all(|(m, w)| (m - w).abs() <= 0.1));
    ///
    /// let copy = Mutation::new(0.0, 0.1, Noise::Gaussian).apply(&weights, &mut seeded(1));
    /// assert_eq!(copy, weights);
    /// ```
    pub fn apply<R: Rng + ?Sized>(&self, weights: &WeightSet, rng: &mut R) -> WeightSet {
        if self.rate <= 0.0 {
            return weights.clone();
        }
        weights.map(|w| {
            if chance(rng, self.rate) {
                w + self.perturbation(rng)
            } else {
                w
            }
        })
    }

    /// Returns a fresh, unevaluated mutant of `individual`.
    pub fn mutate<R: Rng + ?Sized>(&self, individual: &Individual, rng: &mut R) -> Individual {
        Individual::new(self.apply(individual.weights(), rng))
    }

    fn perturbation<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self.noise {
            Noise::Gaussian => rng.sample::<f32, _>(StandardNormal) * self.magnitude,
            Noise::Uniform => rng.gen_range(-1.0f32..=1.0) * self.magnitude,
        }
    }
}

/// Mutates `individual` with Gaussian noise of standard
/// deviation `magnitude`, perturbing each parameter with
/// probability `rate`.
pub fn mutate<R: Rng + ?Sized>(
    individual: &Individual,
    rate: f32,
    magnitude: f32,
    rng: &mut R,
) -> Individual {
    Mutation::new(rate, magnitude, Noise::Gaussian).mutate(individual, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluation;
    use crate::rng::seeded;
    use crate::weights::Topology;

    fn parent() -> Individual {
        let topology = Topology::new(vec![4, 6, 2]).unwrap();
        Individual::with_evaluation(
            WeightSet::random_init(&topology, &mut seeded(5)),
            Evaluation::from_cases(vec![1.0]),
        )
    }

    #[test]
    fn mutants_are_fresh_and_shape_preserving() {
        let parent = parent();
        let mutant = mutate(&parent, 0.5, 0.3, &mut seeded(0));
        assert!(!mutant.is_evaluated());
        assert_eq!(mutant.weights().shape(), parent.weights().shape());
        assert_ne!(mutant.weights(), parent.weights());
    }

    #[test]
    fn zero_rate_is_identity() {
        let parent = parent();
        for noise in [Noise::Gaussian, Noise::Uniform] {
            let mutant = Mutation::new(0.0, 10.0, noise).mutate(&parent, &mut seeded(0));
            assert_eq!(mutant.weights(), parent.weights());
        }
    }

    #[test]
    fn full_rate_touches_every_parameter() {
        let parent = parent();
        let mutant = Mutation::new(1.0, 1.0, Noise::Uniform).mutate(&parent, &mut seeded(2));
        assert!(mutant
            .weights()
            .values()
            .zip(parent.weights().values())
            .all(|(m, p)| m != p && (m - p).abs() <= 1.0));
    }

    #[test]
    fn rate_controls_mutated_fraction() {
        let topology = Topology::new(vec![50, 40, 10]).unwrap();
        let weights = WeightSet::zeros(&topology);
        let mutant = Mutation::new(0.25, 1.0, Noise::Gaussian).apply(&weights, &mut seeded(9));
        let changed = mutant.values().filter(|v| **v != 0.0).count() as f32;
        let fraction = changed / weights.len() as f32;
        assert!((fraction - 0.25).abs() < 0.05, "{}", fraction);
    }

    #[test]
    fn mutation_is_deterministic() {
        let parent = parent();
        let a = mutate(&parent, 0.3, 0.2, &mut seeded(4));
        let b = mutate(&parent, 0.3, 0.2, &mut seeded(4));
        assert_eq!(a, b);
    }
}
