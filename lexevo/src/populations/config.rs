use super::logging::ReportingLevel;
use super::ConfigurationError;
use crate::operators::{CrossoverRule, Noise};

use serde::{Deserialize, Serialize};

/// What hybrid mode does with refined parents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HybridPolicy {
    /// Offspring are mutants or crossovers of the refined parents.
    RefineThenVary,
    /// Offspring are unaltered copies of the refined parents.
    RefineOnly,
}

impl Default for HybridPolicy {
    fn default() -> Self {
        HybridPolicy::RefineThenVary
    }
}

/// Configuration data for population generation
/// and evolution.
///
/// Missing fields take their [default](EngineConfig::default)
/// values when deserializing.
///
/// # Note
/// All quantities expressing probabilities
/// must be in the range [0.0, 1.0]. Configurations
/// are checked by [`EngineConfig::validate`] when
/// an engine is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the population.
    pub population_size: usize,
    /// Number of parents chosen by lexicase
    /// selection each generation.
    pub selection_size: usize,
    /// Gradient descent step size used to refine
    /// selected parents. Zero disables hybrid mode.
    pub learning_rate: f32,
    /// Gradient descent passes over the training data
    /// per refinement.
    pub epochs: usize,
    /// Number of generations per run.
    pub generations: usize,
    /// Names of the error metrics which, crossed with the
    /// training examples, make up the selection cases.
    /// The first one determines aggregate fitness.
    pub cases: Vec<String>,
    /// Verbosity of per-generation tracing events:
    /// 0 emits them at `DEBUG`, anything higher at `INFO`.
    pub verbose: u8,
    /// Lexicase selection tolerance.
    pub epsilon: f32,
    /// Chance that any single parameter of an
    /// offspring is mutated.
    pub mutation_rate: f32,
    /// Scale of mutation noise.
    pub mutation_magnitude: f32,
    pub noise: Noise,
    pub crossover: CrossoverRule,
    /// Chance that a hybrid-mode offspring is a crossover
    /// of two distinct parents rather than a mutant of one.
    pub recombination_chance: f32,
    pub hybrid_policy: HybridPolicy,
    /// Which individuals are kept in the run history.
    pub reporting_level: ReportingLevel,
}

impl EngineConfig {
    /// Returns whether gradient refinement of parents is enabled.
    pub fn is_hybrid(&self) -> bool {
        self.learning_rate > 0.0
    }

    /// Checks every hyperparameter.
    ///
    /// # Errors
    /// Returns the first problem found.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{ConfigurationError, EngineConfig};
    ///
    /// assert!(EngineConfig::default().validate().is_ok());
    ///
    /// let config = EngineConfig {
    ///     population_size: 4,
    ///     selection_size: 5,
    ///     ..EngineConfig::default()
    /// };
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigurationError::SelectionSize { selection_size: 5, population_size: 4 }),
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population_size == 0 {
            return Err(ConfigurationError::ZeroPopulation);
        }
        if self.selection_size == 0 || self.selection_size > self.population_size {
            return Err(ConfigurationError::SelectionSize {
                selection_size: self.selection_size,
                population_size: self.population_size,
            });
        }
        if self.generations == 0 {
            return Err(ConfigurationError::ZeroGenerations);
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(ConfigurationError::LearningRate(self.learning_rate));
        }
        if self.cases.is_empty() {
            return Err(ConfigurationError::NoCases);
        }
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("mutation_magnitude", self.mutation_magnitude),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::NonNegative { name, value });
            }
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("recombination_chance", self.recombination_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::Probability { name, value });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            population_size: 5,
            selection_size: 3,
            learning_rate: 0.0,
            epochs: 5,
            generations: 2,
            cases: vec!["mse".to_owned(), "l2".to_owned()],
            verbose: 1,
            epsilon: 0.0,
            mutation_rate: 0.1,
            mutation_magnitude: 0.1,
            noise: Noise::Gaussian,
            crossover: CrossoverRule::Uniform,
            recombination_chance: 0.5,
            hybrid_policy: HybridPolicy::RefineThenVary,
            reporting_level: ReportingLevel::NoIndividuals,
        }
    }
}
