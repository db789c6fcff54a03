//! Ground-truth arm means.
//!
//! Arms are identified by their index in `[0, k)`. `ArmMeans` holds the hidden
//! true mean of every arm together with the index of the arm the oracle would
//! play.

use std::fmt;

use crate::error::{BanditError, Result};

/// The true mean reward of every arm.
///
/// # Examples
///
/// ```
/// use banditsim::ArmMeans;
///
/// let arms = ArmMeans::new(vec![0.6, 0.9, 0.3]).unwrap();
/// assert_eq!(arms.len(), 3);
/// assert_eq!(arms.best_arm(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ArmMeans {
    means: Vec<f64>,
    best_arm: usize,
}

impl ArmMeans {
    /// Creates the arm table, rejecting an empty or non-finite mean vector.
    pub fn new(means: Vec<f64>) -> Result<Self> {
        if means.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }
        if let Some(ix) = means.iter().position(|m| !m.is_finite()) {
            return Err(BanditError::invalid(format!("mean of arm {ix} is not finite")));
        }
        let best_arm = argmax(&means);
        Ok(Self { means, best_arm })
    }

    /// Creates the arm table and checks it holds exactly `num_arms` entries.
    pub fn with_len(means: Vec<f64>, num_arms: usize) -> Result<Self> {
        if num_arms == 0 {
            return Err(BanditError::NoArmsAvailable);
        }
        if means.len() != num_arms {
            return Err(BanditError::DimensionMismatch {
                message: format!("expected {num_arms} arm means, got {}", means.len()),
            });
        }
        Self::new(means)
    }

    /// Number of arms (k).
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Always false; an empty table cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// The true means in arm order.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// True mean of a single arm.
    pub fn mean(&self, arm: usize) -> Option<f64> {
        self.means.get(arm).copied()
    }

    /// Index of the arm with the highest true mean (lowest index on ties).
    pub fn best_arm(&self) -> usize {
        self.best_arm
    }

    /// Moves one arm's mean by `delta` and recomputes the oracle arm.
    pub(crate) fn shift(&mut self, arm: usize, delta: f64) {
        self.means[arm] += delta;
        self.best_arm = argmax(&self.means);
    }

    /// Checks every mean is a valid success probability.
    pub(crate) fn ensure_probabilities(&self) -> Result<()> {
        match self.means.iter().position(|m| !(0.0..=1.0).contains(m)) {
            Some(ix) => Err(BanditError::invalid(format!(
                "Bernoulli mean of arm {ix} is {}, expected a value in [0, 1]",
                self.means[ix]
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ArmMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (ix, mean) in self.means.iter().enumerate() {
            if ix > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{mean:.3}")?;
        }
        write!(f, "]")
    }
}

/// Index of the largest value, keeping the lowest index on ties.
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (ix, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = ix;
        }
    }
    best
}
