//! Early stopping callback for training.
//!
//! Monitors a validation metric and stops training when no improvement is seen
//! for a specified number of rounds.

/// Early stopping configuration and state.
///
/// Monitors a metric during training and signals when to stop based on lack
/// of improvement over a patience window. A patience of 0 disables stopping
/// while still tracking the best value and round.
pub struct EarlyStopping {
    /// Number of rounds without improvement before stopping.
    patience: usize,
    /// Best metric value seen so far.
    best_value: Option<f64>,
    /// Round at which best value was observed.
    best_round: usize,
    /// Current round.
    current_round: usize,
    /// Whether higher metric values are better.
    higher_is_better: bool,
}

impl EarlyStopping {
    /// Create a new early stopping callback.
    ///
    /// # Arguments
    ///
    /// * `patience` - Number of rounds without improvement before stopping (0 disables)
    /// * `higher_is_better` - Whether higher metric values indicate improvement
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }

    /// Whether stopping is enabled (patience > 0).
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Update with a metric value and check if training should stop.
    ///
    /// Returns `true` if training should stop (no improvement for `patience`
    /// rounds). Always returns `false` when stopping is disabled.
    pub fn should_stop(&mut self, value: f64) -> bool {
        let is_improvement = match self.best_value {
            None => true,
            Some(best) => {
                if self.higher_is_better {
                    value > best
                } else {
                    value < best
                }
            }
        };

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }

        self.current_round += 1;

        self.is_enabled() && self.current_round - self.best_round > self.patience
    }

    /// Get the best metric value observed.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Get the round at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    /// Get the current round number.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Reset the early stopping state.
    pub fn reset(&mut self) {
        self.best_value = None;
        self.best_round = 0;
        self.current_round = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stop_while_improving() {
        let mut early_stop = EarlyStopping::new(3, false); // lower is better

        assert!(!early_stop.should_stop(1.0));
        assert!(!early_stop.should_stop(0.9));
        assert!(!early_stop.should_stop(0.8));
        assert!(!early_stop.should_stop(0.7));
        assert!(!early_stop.should_stop(0.6));

        assert_eq!(early_stop.best_round(), 4);
        assert!((early_stop.best_value().unwrap() - 0.6).abs() < 1e-10);
    }

    #[test]
    fn stops_after_patience() {
        let mut early_stop = EarlyStopping::new(3, false);

        // Best at round 0, then no improvement
        assert!(!early_stop.should_stop(0.5)); // current=1, best=0
        assert!(!early_stop.should_stop(0.6)); // current=2, best=0
        assert!(!early_stop.should_stop(0.7)); // current=3, best=0
        assert!(early_stop.should_stop(0.8)); // current=4, 4-0 > 3

        assert_eq!(early_stop.best_round(), 0);
        assert!((early_stop.best_value().unwrap() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn improvement_resets_window() {
        let mut early_stop = EarlyStopping::new(3, false);

        assert!(!early_stop.should_stop(1.0));
        assert!(!early_stop.should_stop(1.1));
        assert!(!early_stop.should_stop(1.2));

        // New improvement resets counter
        assert!(!early_stop.should_stop(0.9)); // best=3
        assert!(!early_stop.should_stop(1.0));
        assert!(!early_stop.should_stop(1.1));
        assert!(early_stop.should_stop(1.2)); // 7-3 > 3

        assert_eq!(early_stop.best_round(), 3);
    }

    #[test]
    fn higher_is_better_direction() {
        let mut early_stop = EarlyStopping::new(2, true);

        assert!(!early_stop.should_stop(0.8));
        assert!(!early_stop.should_stop(0.9)); // best=1
        assert!(!early_stop.should_stop(0.85));
        assert!(early_stop.should_stop(0.85)); // 4-1 > 2

        assert_eq!(early_stop.best_round(), 1);
        assert!((early_stop.best_value().unwrap() - 0.9).abs() < 1e-10);
    }

    #[test]
    fn disabled_tracks_best_without_stopping() {
        let mut early_stop = EarlyStopping::new(0, false);
        assert!(!early_stop.is_enabled());

        for round in 0..100 {
            let value = if round == 7 { -1.0 } else { 0.0 };
            assert!(!early_stop.should_stop(value));
        }
        assert_eq!(early_stop.best_round(), 7);
    }

    #[test]
    fn reset_clears_state() {
        let mut early_stop = EarlyStopping::new(3, false);

        early_stop.should_stop(0.5);
        early_stop.should_stop(0.6);
        assert_eq!(early_stop.current_round(), 2);

        early_stop.reset();
        assert_eq!(early_stop.current_round(), 0);
        assert_eq!(early_stop.best_round(), 0);
        assert!(early_stop.best_value().is_none());
    }
}
