//! Training infrastructure for the boosted stacking ensemble.
//!
//! ## Shared Infrastructure
//!
//! - [`ObjectiveFn`] / [`SquaredLoss`]: gradient computation
//! - [`MetricFn`] / [`NegativeKappa`]: pluggable monitored metric
//! - [`MetricValue`], [`EvalSet`], [`Evaluator`]: evaluation during training
//! - [`EarlyStopping`]: stop when the monitored metric plateaus
//! - [`TrainingLogger`], [`Verbosity`]: structured logging
//!
//! ## GBDT Training
//!
//! - [`gbdt`]: depth-wise exact-greedy boosting with early stopping

mod callback;
mod eval;
pub mod gbdt;
mod logger;
mod metrics;
mod objectives;

pub use callback::EarlyStopping;
pub use eval::{EvalSet, Evaluator, MetricValue};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{MetricFn, NegativeKappa, Rmse};
pub use objectives::{GradHess, ObjectiveFn, SquaredLoss};

pub use gbdt::{GBDTParams, GBDTTrainer, GainParams, TrainError, TrainOutput};
