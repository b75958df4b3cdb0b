//! Ensemble training configuration with builder pattern.
//!
//! [`EnsembleConfig`] is the hyperparameter record for one training run: the
//! seven searched boosting parameters plus fixed round/early-stopping budgets.
//! It uses the `bon` crate for builder generation with validation at build
//! time. The `extra` map is an open extension point for library-specific
//! flags that the trainer itself does not interpret.
//!
//! # Example
//!
//! ```
//! use stackboost::config::EnsembleConfig;
//!
//! // All defaults
//! let config = EnsembleConfig::builder().build().unwrap();
//!
//! // Customize searched hyperparameters
//! let config = EnsembleConfig::builder()
//!     .learning_rate(0.1)
//!     .max_depth(8)
//!     .subsample(0.8)
//!     .build()
//!     .unwrap();
//! ```

use std::collections::BTreeMap;

use bon::Builder;

use crate::training::gbdt::{GBDTParams, GainParams};
use crate::training::Verbosity;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Learning rate must be positive.
    InvalidLearningRate(f32),
    /// Number of rounds must be at least 1.
    InvalidNRounds,
    /// Tree depth must be at least 1.
    InvalidMaxDepth(u32),
    /// Invalid sampling ratio (must be in (0, 1]).
    InvalidSamplingRatio { field: &'static str, value: f32 },
    /// Invalid regularization parameter (must be non-negative).
    InvalidRegularization { field: &'static str, value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLearningRate(v) => {
                write!(f, "learning_rate must be positive, got {}", v)
            }
            Self::InvalidNRounds => write!(f, "n_rounds must be at least 1"),
            Self::InvalidMaxDepth(v) => write!(f, "max_depth must be at least 1, got {}", v),
            Self::InvalidSamplingRatio { field, value } => {
                write!(f, "{} must be in (0, 1], got {}", field, value)
            }
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// EnsembleConfig
// =============================================================================

/// Hyperparameter configuration for one ensemble training run.
///
/// Immutable once built; fully determines a run up to the subsampling
/// non-determinism when `seed` is `None`.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EnsembleConfig {
    // === Searched hyperparameters ===
    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    /// Minimum loss reduction to split (aka gamma). Default: 0.0.
    #[builder(default = 0.0)]
    pub min_split_loss: f32,

    /// Maximum tree depth. Default: 6.
    #[builder(default = 6)]
    pub max_depth: u32,

    /// Minimum sum of hessians per child. Default: 1.0.
    #[builder(default = 1.0)]
    pub min_child_weight: f32,

    /// Maximum absolute leaf weight; 0 disables the cap. Default: 0.0.
    #[builder(default = 0.0)]
    pub max_delta_step: f32,

    /// Row subsampling ratio per round. Default: 1.0 (no sampling).
    #[builder(default = 1.0)]
    pub subsample: f32,

    /// Column subsampling ratio per tree. Default: 1.0 (no sampling).
    #[builder(default = 1.0)]
    pub colsample_bytree: f32,

    // === Fixed budgets ===
    /// Round cap. Default: 300.
    #[builder(default = 300)]
    pub n_rounds: u32,

    /// Early stopping patience in rounds. Default: 50. 0 disables.
    #[builder(default = 50)]
    pub early_stopping_rounds: u32,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,

    // === Reproducibility ===
    /// Subsampling seed. `None` (the default) seeds from entropy.
    pub seed: Option<u64>,

    // === Extension point ===
    /// Library-specific passthrough flags; opaque to the trainer.
    #[builder(default)]
    pub extra: BTreeMap<String, f64>,
}

/// Custom finishing function that validates the config.
impl<S: ensemble_config_builder::IsComplete> EnsembleConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `learning_rate <= 0`
    /// - `n_rounds == 0` or `max_depth == 0`
    /// - Sampling ratios outside (0, 1]
    /// - Negative regularization parameters
    pub fn build(self) -> Result<EnsembleConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EnsembleConfig {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_rounds == 0 {
            return Err(ConfigError::InvalidNRounds);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        for (field, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if value <= 0.0 || value > 1.0 {
                return Err(ConfigError::InvalidSamplingRatio { field, value });
            }
        }
        for (field, value) in [
            ("min_split_loss", self.min_split_loss),
            ("min_child_weight", self.min_child_weight),
            ("max_delta_step", self.max_delta_step),
        ] {
            if value < 0.0 {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }
        Ok(())
    }

    /// Convert to trainer parameters.
    pub fn to_trainer_params(&self) -> GBDTParams {
        GBDTParams {
            n_rounds: self.n_rounds,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            gain: GainParams {
                reg_lambda: 1.0,
                min_split_loss: self.min_split_loss,
                min_child_weight: self.min_child_weight,
                max_delta_step: self.max_delta_step,
            },
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            early_stopping_rounds: self.early_stopping_rounds,
            verbosity: self.verbosity,
            seed: self.seed,
        }
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EnsembleConfig::builder().build().unwrap();
        assert_eq!(config.n_rounds, 300);
        assert_eq!(config.early_stopping_rounds, 50);
        assert!((config.learning_rate - 0.3).abs() < 1e-6);
        assert!(config.extra.is_empty());
        assert!(config.seed.is_none());
    }

    #[test]
    fn invalid_learning_rate() {
        let result = EnsembleConfig::builder().learning_rate(0.0).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));

        let result = EnsembleConfig::builder().learning_rate(-0.1).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn invalid_round_and_depth_budgets() {
        let result = EnsembleConfig::builder().n_rounds(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidNRounds)));

        let result = EnsembleConfig::builder().max_depth(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidMaxDepth(0))));
    }

    #[test]
    fn invalid_sampling_ratios() {
        let result = EnsembleConfig::builder().subsample(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSamplingRatio {
                field: "subsample",
                ..
            })
        ));

        let result = EnsembleConfig::builder().colsample_bytree(1.5).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSamplingRatio {
                field: "colsample_bytree",
                ..
            })
        ));
    }

    #[test]
    fn boundary_sampling_ratio_is_valid() {
        let result = EnsembleConfig::builder()
            .subsample(1.0)
            .colsample_bytree(0.05)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn negative_regularization_fails() {
        let result = EnsembleConfig::builder().min_split_loss(-0.1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegularization {
                field: "min_split_loss",
                ..
            })
        ));
    }

    #[test]
    fn extra_flags_are_carried_opaquely() {
        let mut extra = BTreeMap::new();
        extra.insert("num_class".to_string(), 1.0);
        extra.insert("silent".to_string(), 1.0);
        let config = EnsembleConfig::builder().extra(extra).build().unwrap();
        assert_eq!(config.extra.len(), 2);
        assert_eq!(config.extra["num_class"], 1.0);
    }

    #[test]
    fn trainer_params_mapping() {
        let config = EnsembleConfig::builder()
            .learning_rate(0.05)
            .min_split_loss(0.2)
            .max_depth(4)
            .min_child_weight(7.0)
            .max_delta_step(2.0)
            .subsample(0.9)
            .colsample_bytree(0.8)
            .seed(13u64)
            .build()
            .unwrap();

        let params = config.to_trainer_params();
        assert_eq!(params.n_rounds, 300);
        assert_eq!(params.max_depth, 4);
        assert!((params.gain.min_split_loss - 0.2).abs() < 1e-6);
        assert!((params.gain.min_child_weight - 7.0).abs() < 1e-6);
        assert!((params.gain.max_delta_step - 2.0).abs() < 1e-6);
        assert!((params.subsample - 0.9).abs() < 1e-6);
        assert_eq!(params.seed, Some(13));
    }
}
