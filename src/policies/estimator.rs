//! Loss estimators for the EXP3 family.
//!
//! An estimator maps the observed reward of the played arm and that arm's
//! selection probability to the increment added to its cumulative loss.

use std::fmt;
use std::str::FromStr;

use crate::error::{BanditError, Result};

/// Maps `(reward, probability)` of the played arm to a loss increment.
pub trait LossEstimator: Send + Sync + fmt::Debug {
    /// Loss increment for an arm played with `probability` that paid `reward`.
    ///
    /// `reward` is in `[0, 1]` and `probability` in `(0, 1]`.
    fn estimate(&self, reward: f64, probability: f64) -> f64;
}

/// Plain importance-weighted estimator: `(1 - r) / p`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportanceWeighted;

impl LossEstimator for ImportanceWeighted {
    fn estimate(&self, reward: f64, probability: f64) -> f64 {
        (1.0 - reward) / probability
    }
}

/// Implicit exploration: `(1 - r) / (p + gamma)`.
#[derive(Clone, Copy, Debug)]
pub struct ImplicitExploration {
    pub gamma: f64,
}

impl LossEstimator for ImplicitExploration {
    fn estimate(&self, reward: f64, probability: f64) -> f64 {
        (1.0 - reward) / (probability + self.gamma)
    }
}

/// Hard-clipped importance weight: `(1 - r) * min(1, c / p) / c`.
///
/// Bounded by `1 / c` for every `p` in `(0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct Clipped {
    pub clip: f64,
}

impl LossEstimator for Clipped {
    fn estimate(&self, reward: f64, probability: f64) -> f64 {
        let weight = (1.0 / self.clip) * (self.clip / probability).min(1.0);
        (1.0 - reward) * weight
    }
}

/// Smoothly clipped importance weight: `(1 - r) * ln(1 + c / p) / c`.
#[derive(Clone, Copy, Debug)]
pub struct SoftClipped {
    pub clip: f64,
}

impl LossEstimator for SoftClipped {
    fn estimate(&self, reward: f64, probability: f64) -> f64 {
        let weight = (1.0 / self.clip) * (self.clip / probability).ln_1p();
        (1.0 - reward) * weight
    }
}

/// Selects which loss estimator an EXP3 policy uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exp3Variant {
    /// `exp3`
    #[default]
    Plain,
    /// `exp3_ix`
    ImplicitExploration,
    /// `exp3_clip`
    Clipped,
    /// `exp3_soft_clip`
    SoftClipped,
}

impl Exp3Variant {
    /// Every variant, in declaration order.
    pub const ALL: [Exp3Variant; 4] = [
        Exp3Variant::Plain,
        Exp3Variant::ImplicitExploration,
        Exp3Variant::Clipped,
        Exp3Variant::SoftClipped,
    ];

    /// Tag used in configuration (`exp3`, `exp3_ix`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Exp3Variant::Plain => "exp3",
            Exp3Variant::ImplicitExploration => "exp3_ix",
            Exp3Variant::Clipped => "exp3_clip",
            Exp3Variant::SoftClipped => "exp3_soft_clip",
        }
    }

    /// Builds the estimator for this variant.
    ///
    /// The IX bias and both clip levels are half the learning rate.
    pub fn estimator(self, learning_rate: f64) -> Box<dyn LossEstimator> {
        let level = 0.5 * learning_rate;
        match self {
            Exp3Variant::Plain => Box::new(ImportanceWeighted),
            Exp3Variant::ImplicitExploration => Box::new(ImplicitExploration { gamma: level }),
            Exp3Variant::Clipped => Box::new(Clipped { clip: level }),
            Exp3Variant::SoftClipped => Box::new(SoftClipped { clip: level }),
        }
    }
}

impl FromStr for Exp3Variant {
    type Err = BanditError;

    fn from_str(tag: &str) -> Result<Self> {
        Exp3Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(tag))
            .ok_or_else(|| BanditError::UnsupportedAlgorithm {
                tag: tag.to_string(),
            })
    }
}

impl fmt::Display for Exp3Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
