//! Completed-trial bookkeeping for the sampler.

/// One evaluated configuration and its loss.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// Values aligned with the search space dimension order.
    pub values: Vec<f64>,
    /// Minimized objective (negated kappa).
    pub loss: f64,
}

/// History of completed trials, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct TrialHistory {
    records: Vec<TrialRecord>,
}

impl TrialHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TrialRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Index and record of the lowest-loss trial. NaN losses never win.
    pub fn best(&self) -> Option<(usize, &TrialRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.loss.is_nan())
            .min_by(|(_, a), (_, b)| {
                a.loss
                    .partial_cmp(&b.loss)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(loss: f64) -> TrialRecord {
        TrialRecord {
            values: vec![loss],
            loss,
        }
    }

    #[test]
    fn best_picks_minimum() {
        let mut history = TrialHistory::new();
        history.push(record(-0.2));
        history.push(record(-0.8));
        history.push(record(-0.5));
        let (idx, best) = history.best().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(best.loss, -0.8);
    }

    #[test]
    fn best_skips_nan() {
        let mut history = TrialHistory::new();
        history.push(record(f64::NAN));
        history.push(record(-0.1));
        assert_eq!(history.best().unwrap().0, 1);
    }

    #[test]
    fn empty_history_has_no_best() {
        assert!(TrialHistory::new().best().is_none());
    }
}
