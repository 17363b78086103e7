//! Error metrics turn a single (prediction, target) pair
//! into a non-negative scalar. Each configured metric
//! contributes one case per training example to lexicase
//! selection.

use crate::populations::ConfigurationError;

use ahash::RandomState;

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Signature of an error metric: `(prediction, target) -> error`.
pub type MetricFn = fn(&[f32], &[f32]) -> f32;

/// A named error metric.
#[derive(Clone)]
pub struct ErrorMetric {
    name: Cow<'static, str>,
    function: MetricFn,
}

impl ErrorMetric {
    /// Mean squared error across outputs.
    pub const MSE: ErrorMetric = ErrorMetric::builtin("mse", mse);
    /// Euclidean distance.
    pub const L2: ErrorMetric = ErrorMetric::builtin("l2", l2);
    /// Manhattan distance.
    pub const L1: ErrorMetric = ErrorMetric::builtin("l1", l1);
    /// Mean absolute error across outputs.
    pub const MAE: ErrorMetric = ErrorMetric::builtin("mae", mae);
    /// Largest absolute error across outputs.
    pub const MAX: ErrorMetric = ErrorMetric::builtin("max", max_abs);

    const fn builtin(name: &'static str, function: MetricFn) -> ErrorMetric {
        ErrorMetric {
            name: Cow::Borrowed(name),
            function,
        }
    }

    /// Creates a user-defined metric.
    ///
    /// `function` should be pure and return
    /// non-negative values.
    ///
    /// # Examples
    /// ```
    /// use lexevo::metrics::ErrorMetric;
    ///
    /// fn cubed(prediction: &[f32], target: &[f32]) -> f32 {
    ///     prediction.iter().zip(target).map(|(p, t)| (p - t).abs().powi(3)).sum()
    /// }
    ///
    /// let metric = ErrorMetric::new("cubed", cubed);
    /// assert_eq!(metric.name(), "cubed");
    /// assert_eq!(metric.error(&[3.0], &[1.0]), 8.0);
    /// ```
    pub fn new(name: impl Into<String>, function: MetricFn) -> ErrorMetric {
        ErrorMetric {
            name: Cow::Owned(name.into()),
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Computes the error of `prediction` against `target`.
    pub fn error(&self, prediction: &[f32], target: &[f32]) -> f32 {
        (self.function)(prediction, target)
    }
}

impl fmt::Debug for ErrorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorMetric").field(&self.name).finish()
    }
}

impl PartialEq for ErrorMetric {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn mean(total: f32, count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

fn mse(prediction: &[f32], target: &[f32]) -> f32 {
    let total = prediction
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    mean(total, target.len())
}

fn l2(prediction: &[f32], target: &[f32]) -> f32 {
    prediction
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f32>()
        .sqrt()
}

fn l1(prediction: &[f32], target: &[f32]) -> f32 {
    prediction.iter().zip(target).map(|(p, t)| (p - t).abs()).sum()
}

fn mae(prediction: &[f32], target: &[f32]) -> f32 {
    mean(l1(prediction, target), target.len())
}

fn max_abs(prediction: &[f32], target: &[f32]) -> f32 {
    prediction
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t).abs())
        .fold(0.0, f32::max)
}

/// A lookup table from metric names to metrics.
///
/// The default registry knows `"mse"`, `"l2"`, `"l1"`,
/// `"mae"` and `"max"`.
#[derive(Clone, Debug)]
pub struct MetricRegistry {
    metrics: HashMap<String, ErrorMetric, RandomState>,
}

impl MetricRegistry {
    /// A registry with no metrics at all.
    pub fn empty() -> MetricRegistry {
        MetricRegistry {
            metrics: HashMap::default(),
        }
    }

    /// Adds a metric, returning any metric previously
    /// registered under the same name.
    pub fn register(&mut self, metric: ErrorMetric) -> Option<ErrorMetric> {
        self.metrics.insert(metric.name().to_owned(), metric)
    }

    pub fn get(&self, name: &str) -> Option<&ErrorMetric> {
        self.metrics.get(name)
    }

    /// Looks up every name in order.
    ///
    /// # Errors
    /// Returns an error naming the first unknown metric.
    ///
    /// # Examples
    /// ```
    /// use lexevo::metrics::{ErrorMetric, MetricRegistry};
    ///
    /// let registry = MetricRegistry::default();
    /// let metrics = registry.resolve(&["mse".to_string(), "l1".to_string()]).unwrap();
    /// assert_eq!(metrics, vec![ErrorMetric::MSE, ErrorMetric::L1]);
    ///
    /// assert!(registry.resolve(&["huber".to_string()]).is_err());
    /// ```
    pub fn resolve(&self, names: &[String]) -> Result<Vec<ErrorMetric>, ConfigurationError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| ConfigurationError::UnknownMetric(name.clone()))
            })
            .collect()
    }

    /// Iterates over the names of every registered metric.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        let mut registry = MetricRegistry::empty();
        for metric in [
            ErrorMetric::MSE,
            ErrorMetric::L2,
            ErrorMetric::L1,
            ErrorMetric::MAE,
            ErrorMetric::MAX,
        ] {
            registry.register(metric);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREDICTION: [f32; 2] = [1.0, 4.0];
    const TARGET: [f32; 2] = [2.0, 2.0];

    #[test]
    fn builtin_values() {
        assert_eq!(ErrorMetric::MSE.error(&PREDICTION, &TARGET), 2.5);
        assert_eq!(ErrorMetric::L2.error(&PREDICTION, &TARGET), 5.0f32.sqrt());
        assert_eq!(ErrorMetric::L1.error(&PREDICTION, &TARGET), 3.0);
        assert_eq!(ErrorMetric::MAE.error(&PREDICTION, &TARGET), 1.5);
        assert_eq!(ErrorMetric::MAX.error(&PREDICTION, &TARGET), 2.0);
    }

    #[test]
    fn builtins_are_non_negative_and_zero_on_match() {
        let registry = MetricRegistry::default();
        for name in registry.names() {
            let metric = registry.get(name).unwrap();
            assert_eq!(metric.error(&TARGET, &TARGET), 0.0, "{}", name);
            assert!(metric.error(&PREDICTION, &TARGET) > 0.0, "{}", name);
            assert_eq!(metric.error(&[], &[]), 0.0, "{}", name);
        }
        assert_eq!(registry.names().count(), 5);
    }

    #[test]
    fn custom_metrics_can_be_registered() {
        fn zero(_: &[f32], _: &[f32]) -> f32 {
            0.0
        }

        let mut registry = MetricRegistry::empty();
        assert!(registry.get("mse").is_none());
        assert!(registry.register(ErrorMetric::new("zero", zero)).is_none());
        assert!(registry.register(ErrorMetric::new("zero", zero)).is_some());
        assert_eq!(
            registry.resolve(&["zero".to_string(), "mse".to_string()]),
            Err(ConfigurationError::UnknownMetric("mse".into()))
        );
    }
}
