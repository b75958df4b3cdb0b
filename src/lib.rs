//! Gradient-boosted stacking of base-model activations with Bayesian
//! hyperparameter search.
//!
//! The crate covers the second level of a two-level model: per-example
//! activation matrices exported by several base models are stacked
//! column-wise into one feature matrix ([`stacking`]), a gradient-boosted
//! decision tree ensemble is trained on it against a quadratic-weighted
//! kappa objective ([`ensemble`], [`training`]), and a Tree-structured
//! Parzen Estimator searches the boosting hyperparameters over repeated
//! trials ([`search`]). Every trial's fitted forest is persisted together
//! with its best round ([`persist`]).
//!
//! # Example
//!
//! ```no_run
//! use stackboost::persist::DirStore;
//! use stackboost::search::{tune, TuneOptions};
//! use stackboost::stacking::{stack, ActivationPair, LabelPair, StackOptions};
//! # fn activations() -> (Vec<ActivationPair>, LabelPair) { unimplemented!() }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (models, labels) = activations();
//! let data = stack(&models, &labels, StackOptions::default())?;
//!
//! let store = DirStore::create("models")?;
//! let options = TuneOptions::builder().n_trials(100).seed(42u64).build();
//! let outcome = tune(&store, &data, &options)?;
//! println!("best loss {} at trial {}", outcome.best_loss, outcome.best_trial);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ensemble;
pub mod persist;
pub mod repr;
pub mod search;
pub mod stacking;
pub mod testing;
pub mod training;
pub mod utils;

pub use config::{ConfigError, EnsembleConfig};
pub use ensemble::{EnsembleError, EnsembleTrainer, TrialOutcome};
pub use persist::{Artifact, ArtifactStore, DirStore, MemoryStore, StoreError};
pub use repr::{Forest, Tree};
pub use search::{tune, tune_models, SearchOutcome, TuneError, TuneOptions};
pub use stacking::{stack, ActivationPair, LabelPair, StackError, StackOptions, StackedData};
pub use training::{GBDTParams, GBDTTrainer, Verbosity};
pub use utils::Parallelism;
