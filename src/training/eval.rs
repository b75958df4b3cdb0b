//! Evaluation utilities for training.
//!
//! Provides the [`Evaluator`] component for computing metrics during training,
//! and [`MetricValue`] for wrapping computed metrics with metadata.

use ndarray::ArrayView2;

use super::metrics::MetricFn;

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
///
/// Wraps a metric value with its name and direction information.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    /// Name of the metric (e.g., "train-kappa", "eval-kappa").
    pub name: String,
    /// The computed value.
    pub value: f64,
    /// Whether higher values are better.
    pub higher_is_better: bool,
}

impl MetricValue {
    /// Create a new metric value.
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// EvalSet
// =============================================================================

/// Named evaluation dataset.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub features: ArrayView2<'a, f32>,
    pub labels: &'a [f32],
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, features: ArrayView2<'a, f32>, labels: &'a [f32]) -> Self {
        Self {
            name,
            features,
            labels,
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes per-round metrics on the training set and all eval sets.
///
/// Metric order is train first, then eval sets in listing order. Early
/// stopping monitors the last-listed eval set; with no eval sets it falls
/// back to the training metric.
pub struct Evaluator<'a, M: MetricFn> {
    metric: &'a M,
}

impl<'a, M: MetricFn> Evaluator<'a, M> {
    /// Create a new evaluator.
    pub fn new(metric: &'a M) -> Self {
        Self { metric }
    }

    /// Whether higher metric values are better.
    pub fn higher_is_better(&self) -> bool {
        self.metric.higher_is_better()
    }

    /// The metric name.
    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    /// Evaluate accumulated predictions on the training set and eval sets.
    ///
    /// `eval_predictions[i]` holds the accumulated predictions for
    /// `eval_sets[i]`.
    pub fn evaluate_round(
        &self,
        train_predictions: &[f32],
        train_targets: &[f32],
        eval_sets: &[EvalSet<'_>],
        eval_predictions: &[Vec<f32>],
    ) -> Vec<MetricValue> {
        debug_assert_eq!(eval_sets.len(), eval_predictions.len());
        let mut metrics = Vec::with_capacity(1 + eval_sets.len());

        metrics.push(MetricValue::new(
            format!("train-{}", self.metric_name()),
            self.metric.compute(train_predictions, train_targets),
            self.higher_is_better(),
        ));

        for (eval_set, preds) in eval_sets.iter().zip(eval_predictions) {
            metrics.push(MetricValue::new(
                format!("{}-{}", eval_set.name, self.metric_name()),
                self.metric.compute(preds, eval_set.labels),
                self.higher_is_better(),
            ));
        }

        metrics
    }

    /// Get the early stopping value from round metrics.
    ///
    /// Returns the last eval set's metric if any eval sets exist, otherwise
    /// the training metric.
    pub fn monitored_value(metrics: &[MetricValue]) -> f64 {
        metrics.last().map(|m| m.value).unwrap_or(f64::NAN)
    }
}
