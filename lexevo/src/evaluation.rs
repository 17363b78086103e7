//! Fitness evaluation: every weight set is scored on every
//! (training example, error metric) pair, producing the
//! per-case error vector used by lexicase selection and the
//! aggregate fitness used to track the best model.

use crate::metrics::{ErrorMetric, MetricRegistry};
use crate::model::Model;
use crate::populations::{ConfigurationError, DataError};
use crate::weights::{Topology, WeightSet};

use serde::{Deserialize, Serialize};

/// The outcome of evaluating a weight set.
///
/// Errors are laid out example-major: the first
/// `metric_count` entries belong to the first example,
/// one per metric in configuration order, and so on.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Evaluation {
    errors: Vec<f32>,
    metric_count: usize,
    fitness: f32,
}

impl Evaluation {
    /// Builds an evaluation from already-computed case errors.
    ///
    /// # Panics
    /// Panics if `metric_count` is zero or does not divide
    /// the number of errors.
    ///
    /// # Examples
    /// ```
    /// use lexevo::Evaluation;
    ///
    /// // Two examples, two metrics each.
    /// let evaluation = Evaluation::new(vec![0.5, 1.0, 0.25, 0.5], 2, 0.375);
    /// assert_eq!(evaluation.case_count(), 4);
    /// assert_eq!(evaluation.example_count(), 2);
    /// assert_eq!(evaluation.example_errors(1), &[0.25, 0.5]);
    /// assert_eq!(evaluation.fitness(), 0.375);
    /// ```
    pub fn new(errors: Vec<f32>, metric_count: usize, fitness: f32) -> Evaluation {
        assert!(
            metric_count > 0 && errors.len() % metric_count == 0,
            "{} case errors cannot be split across {} metrics",
            errors.len(),
            metric_count
        );
        Evaluation {
            errors,
            metric_count,
            fitness,
        }
    }

    /// Builds a single-metric evaluation whose aggregate
    /// fitness is the mean case error.
    pub fn from_cases(errors: Vec<f32>) -> Evaluation {
        let fitness = errors.iter().sum::<f32>() / errors.len().max(1) as f32;
        Evaluation::new(errors, 1, fitness)
    }

    /// All case errors.
    pub fn errors(&self) -> &[f32] {
        &self.errors
    }

    /// The error on a single case.
    pub fn error(&self, case: usize) -> f32 {
        self.errors[case]
    }

    pub fn case_count(&self) -> usize {
        self.errors.len()
    }

    pub fn metric_count(&self) -> usize {
        self.metric_count
    }

    pub fn example_count(&self) -> usize {
        self.errors.len() / self.metric_count
    }

    /// The errors of one example, one per metric.
    pub fn example_errors(&self, example: usize) -> &[f32] {
        let start = example * self.metric_count;
        &self.errors[start..start + self.metric_count]
    }

    /// Aggregate fitness: the mean of the primary metric.
    /// Lower is better.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Computes per-case errors of weight sets using a [`Model`].
#[derive(Clone, Debug, PartialEq)]
pub struct FitnessEvaluator {
    metrics: Vec<ErrorMetric>,
}

impl FitnessEvaluator {
    /// Creates an evaluator over the given metrics.
    /// The first metric is the primary one.
    ///
    /// # Errors
    /// Returns an error if no metrics are given.
    pub fn new(metrics: Vec<ErrorMetric>) -> Result<FitnessEvaluator, ConfigurationError> {
        if metrics.is_empty() {
            return Err(ConfigurationError::NoCases);
        }
        Ok(FitnessEvaluator { metrics })
    }

    /// Creates an evaluator over the metrics named in `names`.
    ///
    /// # Errors
    /// Returns an error if `names` is empty or contains
    /// a name unknown to `registry`.
    pub fn from_names(
        names: &[String],
        registry: &MetricRegistry,
    ) -> Result<FitnessEvaluator, ConfigurationError> {
        FitnessEvaluator::new(registry.resolve(names)?)
    }

    pub fn metrics(&self) -> &[ErrorMetric] {
        &self.metrics
    }

    /// Checks that the training data can be fed to a
    /// network of the given topology.
    ///
    /// # Errors
    /// Returns an error if the data is empty, inputs and targets
    /// differ in count, or any row has the wrong width.
    pub fn check_data(
        topology: &Topology,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<(), DataError> {
        if inputs.is_empty() {
            return Err(DataError::Empty);
        }
        if inputs.len() != targets.len() {
            return Err(DataError::LengthMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        if let Some((example, row)) = inputs
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != topology.input_count())
        {
            return Err(DataError::InputWidth {
                example,
                expected: topology.input_count(),
                found: row.len(),
            });
        }
        if let Some((example, row)) = targets
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != topology.output_count())
        {
            return Err(DataError::TargetWidth {
                example,
                expected: topology.output_count(),
                found: row.len(),
            });
        }
        Ok(())
    }

    /// Evaluates `weights` on every example and metric.
    ///
    /// # Errors
    /// Returns an error if the model returns a prediction
    /// for each example that cannot be matched with its target.
    pub fn evaluate<M: Model>(
        &self,
        model: &M,
        weights: &WeightSet,
        inputs: &[Vec<f32>],
        targets: &[Vec<f32>],
    ) -> Result<Evaluation, DataError> {
        let predictions = model.evaluate(weights, inputs);
        if predictions.len() != targets.len() {
            return Err(DataError::PredictionCount {
                expected: targets.len(),
                found: predictions.len(),
            });
        }

        let mut errors = Vec::with_capacity(targets.len() * self.metrics.len());
        let mut primary_total = 0.0;
        for (example, (prediction, target)) in predictions.iter().zip(targets).enumerate() {
            if prediction.len() != target.len() {
                return Err(DataError::TargetWidth {
                    example,
                    expected: prediction.len(),
                    found: target.len(),
                });
            }
            for (m, metric) in self.metrics.iter().enumerate() {
                let error = metric.error(prediction, target);
                if m == 0 {
                    primary_total += error;
                }
                errors.push(error);
            }
        }

        let fitness = primary_total / targets.len().max(1) as f32;
        Ok(Evaluation::new(errors, self.metrics.len(), fitness))
    }
}
