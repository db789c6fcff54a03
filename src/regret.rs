//! Per-round regret bookkeeping.

/// Instantaneous regret of every elapsed round of a single run.
///
/// Regret at a round is the oracle arm's realized reward minus the played
/// arm's realized reward. Under noisy rewards individual entries can be
/// negative, so the cumulative sum is only non-decreasing in expectation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegretLog {
    values: Vec<f64>,
}

impl RegretLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty log with room for `horizon` rounds.
    pub fn with_capacity(horizon: usize) -> Self {
        Self {
            values: Vec::with_capacity(horizon),
        }
    }

    /// Appends the regret of the round that just finished.
    pub fn record(&mut self, regret: f64) {
        self.values.push(regret);
    }

    /// Number of recorded rounds.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Instantaneous regret per round.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Running sum of the instantaneous regret.
    pub fn cumulative(&self) -> Vec<f64> {
        self.values
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect()
    }

    /// Cumulative regret after the last recorded round.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Drops every recorded round.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
