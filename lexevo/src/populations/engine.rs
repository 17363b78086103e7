use super::config::{EngineConfig, HybridPolicy};
use super::logging::EvolutionLogger;
use super::{ConfigurationError, DataError, EvolutionError, Individual, Population};

use crate::evaluation::FitnessEvaluator;
use crate::metrics::MetricRegistry;
use crate::model::Model;
use crate::operators::{recombine, Lexicase, Mutation, RecombinationError};
use crate::rng::{self, chance, EvoRng};
use crate::weights::WeightSet;

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

/// The phases of the generational loop.
///
/// ```text
/// Uninitialized -> Evaluating -> Selecting -> Reproducing -> Replacing
///                      ^                                         |
///                      +-----------------------------------------+
/// Evaluating -> Done, once the configured generations are complete.
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No population exists yet.
    Uninitialized,
    /// Unevaluated individuals are about to be evaluated.
    Evaluating,
    /// Parents are about to be chosen.
    Selecting,
    /// Offspring are about to be bred from the selected parents.
    Reproducing,
    /// Offspring are about to replace the population.
    Replacing,
    /// The run is over.
    Done,
}

/// How a single offspring is bred from the selected parents.
#[derive(Clone, Copy, Debug)]
enum Breeding {
    Copy(usize),
    Mutant(usize),
    Cross(usize, usize),
}

/// Evolves the weights of a [`Model`] with lexicase selection,
/// mutation and, in hybrid mode, recombination and gradient
/// refinement of parents.
pub struct EvolutionEngine<M> {
    config: EngineConfig,
    model: M,
    evaluator: FitnessEvaluator,
    selector: Lexicase,
    mutation: Mutation,
    population: Population,
    best: Option<Individual>,
    state: EngineState,
    generation: usize,
    run_start: usize,
    selected: Vec<Individual>,
    offspring: Vec<Individual>,
    rng: EvoRng,
    logger: EvolutionLogger,
}

impl<M: Model> EvolutionEngine<M> {
    /// Creates an engine with a randomly initialized population,
    /// using the default metric registry to resolve
    /// [`EngineConfig::cases`].
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{EngineConfig, EngineState, EvolutionEngine, Model, Topology};
    /// use lexevo_nn::DenseNetwork;
    ///
    /// let model = DenseNetwork::build(Topology::new(vec![1, 4, 1]).unwrap(), 0);
    /// let engine = EvolutionEngine::new(EngineConfig::default(), model, 42).unwrap();
    ///
    /// assert_eq!(engine.state(), EngineState::Evaluating);
    /// assert_eq!(engine.population().len(), 5);
    /// assert!(engine.best().is_none());
    /// ```
    pub fn new(config: EngineConfig, model: M, seed: u64) -> Result<Self, ConfigurationError> {
        Self::new_in(config, model, seed, &MetricRegistry::default())
    }

    /// Like [`EvolutionEngine::new`], resolving metric
    /// names in the given registry.
    pub fn new_in(
        config: EngineConfig,
        model: M,
        seed: u64,
        registry: &MetricRegistry,
    ) -> Result<Self, ConfigurationError> {
        let mut engine = Self::assemble(config, model, seed, registry)?;
        engine.initialize();
        Ok(engine)
    }

    /// Creates an engine whose initial population holds
    /// the given weight sets.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid,
    /// the number of weight sets differs from the population
    /// size, or any of them does not fit the model's topology.
    pub fn with_population(
        config: EngineConfig,
        model: M,
        seed: u64,
        weights: Vec<WeightSet>,
    ) -> Result<Self, EvolutionError> {
        let mut engine = Self::assemble(config, model, seed, &MetricRegistry::default())?;
        if weights.len() != engine.config.population_size {
            return Err(ConfigurationError::SeedCount {
                expected: engine.config.population_size,
                found: weights.len(),
            }
            .into());
        }
        for w in &weights {
            w.conforms_to(engine.model.topology())?;
        }
        engine.population = Population::from_weights(weights);
        engine.transition(EngineState::Evaluating);
        Ok(engine)
    }

    fn assemble(
        config: EngineConfig,
        model: M,
        seed: u64,
        registry: &MetricRegistry,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let evaluator = FitnessEvaluator::from_names(&config.cases, registry)?;
        Ok(EvolutionEngine {
            selector: Lexicase::new(config.epsilon),
            mutation: Mutation::new(config.mutation_rate, config.mutation_magnitude, config.noise),
            logger: EvolutionLogger::new(config.reporting_level),
            config,
            model,
            evaluator,
            population: Population::default(),
            best: None,
            state: EngineState::Uninitialized,
            generation: 0,
            run_start: 0,
            selected: vec![],
            offspring: vec![],
            rng: rng::seeded(seed),
        })
    }

    fn initialize(&mut self) {
        self.population = Population::random(
            self.model.topology(),
            self.config.population_size,
            &mut self.rng,
        );
        self.transition(EngineState::Evaluating);
    }

    /// Runs the generational loop until the configured number
    /// of generations is complete, returning the best individual
    /// found so far.
    ///
    /// Calling `run` on a finished engine evolves the current
    /// population for another `generations` generations; the
    /// best individual is kept across runs. The population and
    /// the best individual are first scored again on the given
    /// data, which need not be the data of the previous run.
    ///
    /// # Errors
    /// Returns the first error encountered, aborting the run.
    ///
    /// # Examples
    /// ```
    /// use lexevo::{EngineConfig, EvolutionEngine, Model, Topology};
    /// use lexevo_nn::DenseNetwork;
    ///
    /// let inputs: Vec<Vec<f32>> = (0..8).map(|i| vec![i as f32 / 8.0]).collect();
    /// let targets: Vec<Vec<f32>> = inputs.iter().map(|x| vec![x[0] * x[0]]).collect();
    ///
    /// let model = DenseNetwork::build(Topology::new(vec![1, 4, 1]).unwrap(), 0);
    /// let config = EngineConfig {
    ///     population_size: 8,
    ///     generations: 3,
    ///     learning_rate: 0.05,
    ///     ..EngineConfig::default()
    /// };
    /// let mut engine = EvolutionEngine::new(config, model, 7).unwrap();
    ///
    /// let best = engine.run(&inputs, &targets).unwrap();
    /// assert_eq!(engine.generation(), 3);
    /// assert_eq!(best.fitness(), engine.best().and_then(|b| b.fitness()));
    /// ```
    pub fn run(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<Individual, EvolutionError> {
        if self.state == EngineState::Done {
            // Cached errors may come from other data.
            self.reevaluate(inputs, targets)?;
            self.run_start = self.generation;
            self.transition(EngineState::Selecting);
        }
        while self.state != EngineState::Done {
            self.advance(inputs, targets)?;
        }
        self.best.clone().ok_or(EvolutionError::Unevaluated)
    }

    /// Executes a single phase of the generational loop,
    /// returning the new state. Does nothing once [`Done`].
    ///
    /// [`Done`]: EngineState::Done
    ///
    /// # Errors
    /// Returns an error if the training data does not fit the
    /// model, or any operator fails.
    pub fn advance(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<EngineState, EvolutionError> {
        if self.state != EngineState::Done {
            FitnessEvaluator::check_data(self.model.topology(), inputs, targets)?;
        }
        match self.state {
            EngineState::Uninitialized => self.initialize(),
            EngineState::Evaluating => self.evaluate(inputs, targets)?,
            EngineState::Selecting => self.select()?,
            EngineState::Reproducing => self.reproduce(inputs, targets)?,
            EngineState::Replacing => self.replace(),
            EngineState::Done => {}
        }
        Ok(self.state)
    }

    fn evaluate(&mut self, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<(), EvolutionError> {
        let evaluator = &self.evaluator;
        let model = &self.model;
        self.population
            .individuals_mut()
            .par_iter_mut()
            .filter(|individual| !individual.is_evaluated())
            .try_for_each(|individual| -> Result<(), DataError> {
                let evaluation = evaluator.evaluate(model, individual.weights(), inputs, targets)?;
                individual.set_evaluation(evaluation);
                Ok(())
            })?;

        self.update_best();

        let best_fitness = self
            .best
            .as_ref()
            .and_then(Individual::fitness)
            .unwrap_or(f32::NAN);
        self.logger
            .log(self.generation, &self.population, best_fitness);
        if let Some(log) = self.logger.last() {
            let (generation, mean, best) = (log.generation, log.fitness.mean, log.best_fitness);
            if self.config.verbose >= 1 {
                info!(generation, mean, best, "generation evaluated");
            } else {
                debug!(generation, mean, best, "generation evaluated");
            }
        }

        if self.generation - self.run_start >= self.config.generations {
            self.transition(EngineState::Done);
        } else {
            self.transition(EngineState::Selecting);
        }
        Ok(())
    }

    /// Scores the whole population and the best individual
    /// again, replacing any cached evaluations.
    fn reevaluate(&mut self, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<(), EvolutionError> {
        FitnessEvaluator::check_data(self.model.topology(), inputs, targets)?;
        let evaluator = &self.evaluator;
        let model = &self.model;
        self.population
            .individuals_mut()
            .par_iter_mut()
            .chain(self.best.par_iter_mut())
            .try_for_each(|individual| -> Result<(), DataError> {
                let evaluation = evaluator.evaluate(model, individual.weights(), inputs, targets)?;
                individual.set_evaluation(evaluation);
                Ok(())
            })?;
        self.update_best();
        Ok(())
    }

    fn update_best(&mut self) {
        if let Some(champion) = self.population.champion() {
            let improved = match self.best.as_ref().and_then(Individual::ranked_fitness) {
                Some(best) => champion
                    .ranked_fitness()
                    .map_or(false, |f| f.total_cmp(&best).is_lt()),
                None => true,
            };
            if improved {
                self.best = Some(champion.clone());
            }
        }
    }

    fn select(&mut self) -> Result<(), EvolutionError> {
        let indices = self.selector.select_indices(
            self.population.individuals(),
            self.config.selection_size,
            &mut self.rng,
        )?;
        self.selected = indices
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect();
        trace!(parents = ?self.selected_fitness(), "parents selected");
        self.transition(EngineState::Reproducing);
        Ok(())
    }

    fn selected_fitness(&self) -> Vec<Option<f32>> {
        self.selected.iter().map(Individual::fitness).collect()
    }

    fn reproduce(&mut self, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<(), EvolutionError> {
        let hybrid = self.config.is_hybrid();
        if hybrid {
            self.refine_parents(inputs, targets)?;
        }

        let parent_count = self.selected.len();
        let mut plan = Vec::with_capacity(self.config.population_size);
        for i in 0..self.config.population_size {
            let first = i % parent_count;
            let breeding = if hybrid && self.config.hybrid_policy == HybridPolicy::RefineOnly {
                Breeding::Copy(first)
            } else if hybrid
                && parent_count >= 2
                && chance(&mut self.rng, self.config.recombination_chance)
            {
                let mut second = self.rng.gen_range(0..parent_count - 1);
                if second >= first {
                    second += 1;
                }
                Breeding::Cross(first, second)
            } else {
                Breeding::Mutant(first)
            };
            plan.push((breeding, self.rng.gen::<u64>()));
        }

        let parents = &self.selected;
        let mutation = &self.mutation;
        let crossover = self.config.crossover;
        self.offspring = plan
            .into_par_iter()
            .map(|(breeding, seed)| -> Result<Individual, RecombinationError> {
                let mut rng = rng::seeded(seed);
                Ok(match breeding {
                    Breeding::Copy(p) => Individual::new(parents[p].weights().clone()),
                    Breeding::Mutant(p) => mutation.mutate(&parents[p], &mut rng),
                    Breeding::Cross(a, b) => {
                        let child = recombine(&[&parents[a], &parents[b]], crossover, &mut rng)?;
                        mutation.mutate(&child, &mut rng)
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        trace!(offspring = self.offspring.len(), "offspring bred");
        self.transition(EngineState::Replacing);
        Ok(())
    }

    /// Replaces every selected parent with the result of
    /// refining its weights by gradient descent.
    fn refine_parents(&mut self, inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<(), EvolutionError> {
        let model = &self.model;
        let (epochs, learning_rate) = (self.config.epochs, self.config.learning_rate);
        let refined: Vec<WeightSet> = self
            .selected
            .par_iter()
            .map(|parent| model.refine(parent.weights(), inputs, targets, epochs, learning_rate))
            .collect();
        for weights in &refined {
            weights.conforms_to(model.topology())?;
        }
        self.selected = refined.into_iter().map(Individual::new).collect();
        Ok(())
    }

    fn replace(&mut self) {
        self.population = self.offspring.drain(..).collect();
        self.selected.clear();
        self.generation += 1;
        self.transition(EngineState::Evaluating);
    }

    fn transition(&mut self, state: EngineState) {
        trace!(from = ?self.state, to = ?state, generation = self.generation, "phase transition");
        self.state = state;
    }

    /// The current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The individual with the lowest aggregate fitness
    /// seen so far, or `None` before the first evaluation.
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of generations completed, across all runs.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Per-generation run history.
    pub fn logger(&self) -> &EvolutionLogger {
        &self.logger
    }

    /// The parents chosen in the current generation, refined
    /// if in hybrid mode. Empty outside of reproduction.
    pub fn selected(&self) -> &[Individual] {
        &self.selected
    }

    /// Returns a copy of the model holding the best weights.
    ///
    /// # Errors
    /// Returns an error if nothing has been evaluated yet.
    pub fn fitted_model(&self) -> Result<M, EvolutionError>
    where
        M: Clone,
    {
        let best = self.best.as_ref().ok_or(EvolutionError::Unevaluated)?;
        let mut model = self.model.clone();
        model.set_weights(best.weights().clone())?;
        Ok(model)
    }
}
