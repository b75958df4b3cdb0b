//! Structured logging for training output.

use super::eval::MetricValue;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Per-round metrics and early stopping notices.
    Info,
    /// Everything, including per-round tree statistics.
    Debug,
}

/// Writes per-round training progress to stderr.
///
/// Informational only; nothing downstream consumes this output.
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn start_training(&self, n_rounds: usize) {
        if self.verbosity >= Verbosity::Info {
            eprintln!("training: up to {} rounds", n_rounds);
        }
    }

    pub fn log_round(&self, round: usize, metrics: &[MetricValue]) {
        if self.verbosity >= Verbosity::Info {
            let line: Vec<String> = metrics.iter().map(|m| m.to_string()).collect();
            eprintln!("[{}] {}", round, line.join("  "));
        }
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric_name: &str) {
        if self.verbosity >= Verbosity::Info {
            eprintln!(
                "early stopping at round {} (best {} at round {})",
                round, metric_name, best_round
            );
        }
    }

    pub fn log_best(&self, best_iteration: usize, best_score: f64) {
        if self.verbosity >= Verbosity::Info {
            eprintln!(
                "best iteration: {}, best score: {:.6}",
                best_iteration, best_score
            );
        }
    }
}
