use super::{Individual, Population};

use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones the entire population.
    AllIndividuals,
    /// Clones only the generation's champion.
    Champion,
    /// Clones no individuals.
    NoIndividuals,
}

impl Default for ReportingLevel {
    fn default() -> Self {
        ReportingLevel::NoIndividuals
    }
}

/// A snapshot of an evaluated generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub generation: usize,
    pub sample: GenerationSample,
    /// Aggregate fitness statistics over the generation.
    pub fitness: Stats,
    /// Best aggregate fitness seen so far in the run,
    /// including this generation.
    pub best_fitness: f32,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration: {:?}\n\
            \tfitness: {:?}\n\
            \tbest_fitness: {:?}\n\
            }}",
            self.generation, self.fitness, self.best_fitness,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// All statistics of an empty sequence are NaN.
    ///
    /// # Examples
    /// ```
    /// use lexevo::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(stats.median, 2.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f32::NAN,
                minimum: f32::NAN,
                mean: f32::NAN,
                median: f32::NAN,
            };
        }
        let mid = data.len() / 2;
        let (mut max, mut min, mut sum) = (f32::MIN, f32::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f32;
        let mut median = *data.select_nth_unstable_by(mid, f32::total_cmp).1;
        if data.len() % 2 == 0 {
            // The lower half now sits before `mid`.
            let lower = data[..mid]
                .iter()
                .copied()
                .max_by(f32::total_cmp)
                .unwrap_or(median);
            median = (median + lower) / 2.0;
        }
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

/// A reporting-level dependant store
/// of individuals from a generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GenerationSample {
    /// Every individual.
    Population(Vec<Individual>),
    /// Only the generation champion.
    Champion(Individual),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use lexevo::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoIndividuals);
    /// assert!(logger.is_empty());
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    pub fn reporting_level(&self) -> ReportingLevel {
        self.reporting_level
    }

    /// Store a snapshot of an evaluated population.
    ///
    /// Unevaluated members are left out of the statistics.
    pub fn log(&mut self, generation: usize, population: &Population, best_fitness: f32) {
        let sample = match self.reporting_level {
            ReportingLevel::AllIndividuals => {
                GenerationSample::Population(population.individuals().to_vec())
            }
            ReportingLevel::Champion => match population.champion() {
                Some(champion) => GenerationSample::Champion(champion.clone()),
                None => GenerationSample::None,
            },
            ReportingLevel::NoIndividuals => GenerationSample::None,
        };
        self.logs.push(Log {
            generation,
            sample,
            fitness: Stats::from(population.iter().filter_map(Individual::fitness)),
            best_fitness,
        });
    }

    /// Iterate over all logged snapshots.
    ///
    /// # Examples
    /// ```
    /// use lexevo::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::AllIndividuals);
    /// // Log some stuff... then
    /// for log in logger.iter() {
    ///     println!("{}", log);
    /// }
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluation;
    use crate::weights::WeightSet;

    fn population(fitnesses: &[f32]) -> Population {
        fitnesses
            .iter()
            .map(|f| Individual::with_evaluation(WeightSet::default(), Evaluation::from_cases(vec![*f])))
            .collect()
    }

    #[test]
    fn even_length_median() {
        assert_eq!(Stats::from([1.0, 2.0].iter().copied()).median, 1.5);
        assert_eq!(Stats::from([9.0, 1.0, 5.0, 3.0, 7.0, 11.0].iter().copied()).median, 6.0);
    }

    #[test]
    fn empty_stats_are_nan() {
        let stats = Stats::from(std::iter::empty::<f32>());
        assert!(stats.maximum.is_nan() && stats.median.is_nan());
    }

    #[test]
    fn reporting_levels() {
        let population = population(&[3.0, 1.0, 2.0]);

        let mut logger = EvolutionLogger::new(ReportingLevel::AllIndividuals);
        logger.log(0, &population, 1.0);
        assert_eq!(
            logger.last().map(|l| &l.sample),
            Some(&GenerationSample::Population(population.individuals().to_vec()))
        );

        let mut logger = EvolutionLogger::new(ReportingLevel::Champion);
        logger.log(0, &population, 1.0);
        assert_eq!(
            logger.last().map(|l| &l.sample),
            Some(&GenerationSample::Champion(population[1].clone()))
        );

        let mut logger = EvolutionLogger::default();
        logger.log(4, &population, 0.5);
        let log = logger.last().unwrap();
        assert_eq!(log.sample, GenerationSample::None);
        assert_eq!(log.generation, 4);
        assert_eq!(log.best_fitness, 0.5);
        assert_eq!(log.fitness.minimum, 1.0);
        assert_eq!(log.fitness.maximum, 3.0);
        assert_eq!(log.fitness.median, 2.0);
        assert_eq!(logger.len(), 1);
    }
}
