//! Quantized-uniform search space definitions.
//!
//! Every hyperparameter dimension is a [`QUniform`]: a uniform range snapped
//! to a fixed step, so the sampler works over a finite grid. The dimensions
//! searched for ensemble training are fixed in [`ensemble_space`].

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("invalid bounds: low {low} > high {high}")]
    InvalidBounds { low: f64, high: f64 },
    #[error("step must be positive, got {0}")]
    InvalidStep(f64),
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
    #[error("expected {expected} values, got {got}")]
    ValueCountMismatch { expected: usize, got: usize },
}

// =============================================================================
// QUniform
// =============================================================================

/// Uniform range quantized to multiples of `step` starting at `low`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QUniform {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl QUniform {
    pub fn new(low: f64, high: f64, step: f64) -> Result<Self, SpaceError> {
        if low > high {
            return Err(SpaceError::InvalidBounds { low, high });
        }
        if step <= 0.0 {
            return Err(SpaceError::InvalidStep(step));
        }
        Ok(Self { low, high, step })
    }

    /// Number of grid points in the range.
    pub fn n_points(&self) -> usize {
        ((self.high - self.low) / self.step).round() as usize + 1
    }

    /// The i-th grid point, clamped to `high` against rounding drift.
    pub fn point(&self, i: usize) -> f64 {
        (self.low + i as f64 * self.step).min(self.high)
    }

    /// Snap an arbitrary value to the nearest grid point.
    pub fn quantize(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.low, self.high);
        let snapped = self.low + ((clamped - self.low) / self.step).round() * self.step;
        snapped.clamp(self.low, self.high)
    }

    /// Draw a uniform sample and snap it to the grid.
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        self.quantize(rng.random_range(self.low..=self.high))
    }
}

// =============================================================================
// SearchSpace
// =============================================================================

/// A named dimension of the search space.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub name: String,
    pub range: QUniform,
}

/// Ordered collection of named [`QUniform`] dimensions.
///
/// Candidate configurations are `Vec<f64>` aligned with dimension order;
/// [`SearchSpace::value_of`] resolves a value by dimension name.
#[derive(Debug, Clone, Default)]
pub struct SearchSpace {
    dims: Vec<Dimension>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dimension. Builder-chained.
    pub fn dim(mut self, name: impl Into<String>, range: QUniform) -> Self {
        self.dims.push(Dimension {
            name: name.into(),
            range,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    /// Draw one full random configuration.
    pub fn sample(&self, rng: &mut StdRng) -> Vec<f64> {
        self.dims.iter().map(|d| d.range.sample(rng)).collect()
    }

    /// Resolve a named dimension's value out of an aligned value vector.
    pub fn value_of(&self, values: &[f64], name: &str) -> Result<f64, SpaceError> {
        if values.len() != self.dims.len() {
            return Err(SpaceError::ValueCountMismatch {
                expected: self.dims.len(),
                got: values.len(),
            });
        }
        self.dims
            .iter()
            .position(|d| d.name == name)
            .map(|i| values[i])
            .ok_or_else(|| SpaceError::UnknownDimension(name.to_string()))
    }
}

// =============================================================================
// Ensemble search space
// =============================================================================

/// The hyperparameter space searched for ensemble training.
///
/// Seven quantized-uniform dimensions covering shrinkage, tree shape,
/// child-weight and leaf-step regularization, and row/column sampling.
pub fn ensemble_space() -> SearchSpace {
    let q = |low, high, step| QUniform::new(low, high, step).expect("literal bounds are valid");
    SearchSpace::new()
        .dim("learning_rate", q(0.01, 0.5, 0.01))
        .dim("min_split_loss", q(0.05, 1.0, 0.05))
        .dim("max_depth", q(1.0, 15.0, 1.0))
        .dim("min_child_weight", q(0.0, 50.0, 1.0))
        .dim("max_delta_step", q(0.0, 15.0, 1.0))
        .dim("subsample", q(0.05, 1.0, 0.05))
        .dim("colsample_bytree", q(0.05, 1.0, 0.05))
}

// =============================================================================
// Tests
// =============================================================================
