//! Policy trait definition for simulated bandit algorithms

use crate::arm::ArmMeans;
use crate::error::Result;
use crate::policies::{Etc, EtcConfig, Exp3, Exp3Config};
use crate::regret::RegretLog;

/// Outcome of a single simulated round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Zero-based round index.
    pub round: usize,
    /// Arm played by the policy.
    pub arm: usize,
    /// Arm the oracle played (true best arm at this round).
    pub oracle_arm: usize,
    /// Realized reward of the played arm.
    pub reward: f64,
    /// Realized reward of the oracle arm.
    pub oracle_reward: f64,
    /// `oracle_reward - reward`.
    pub regret: f64,
}

/// A bandit policy simulated against a fixed set of arms.
///
/// A policy owns its arm means, reward source and statistics. Every call to
/// [`Policy::step`] plays exactly one round: it draws rewards for all arms
/// from the injected generator, plays an arm, updates its statistics and
/// records the round's regret. State for round `t + 1` always observes the
/// fully updated state of round `t`.
///
/// The generator is passed as `dyn RngCore` so policies can be boxed and
/// selected at configuration time.
pub trait Policy: Send {
    /// Short name of the algorithm (e.g. `"etc"`, `"exp3_ix"`).
    fn name(&self) -> &'static str;

    /// Plays one round.
    ///
    /// # Errors
    /// Returns [`crate::BanditError::NumericalError`] if an internal invariant
    /// is violated; the run must be abandoned.
    fn step(&mut self, rng: &mut dyn rand::RngCore) -> Result<Step>;

    /// Number of rounds played so far.
    fn round(&self) -> usize;

    /// Current ground truth, including any applied mean shift.
    fn arms(&self) -> &ArmMeans;

    /// Arm the oracle plays at the current round.
    fn best_arm(&self) -> usize {
        self.arms().best_arm()
    }

    /// Regret recorded since construction or the last reset.
    fn regret(&self) -> &RegretLog;

    /// Restores the state the policy was constructed with.
    fn reset(&mut self);
}

/// Configuration of a policy, validated when the policy is built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyConfig {
    /// Explore-Then-Commit.
    Etc(EtcConfig),
    /// EXP3 with one of its loss estimators.
    Exp3(Exp3Config),
}

impl PolicyConfig {
    /// Builds a fresh policy with empty statistics.
    pub fn build(&self) -> Result<Box<dyn Policy>> {
        let policy: Box<dyn Policy> = match self {
            PolicyConfig::Etc(config) => Box::new(Etc::new(config.clone())?),
            PolicyConfig::Exp3(config) => Box::new(Exp3::new(config.clone())?),
        };
        Ok(policy)
    }

    /// Name of the configured algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyConfig::Etc(_) => "etc",
            PolicyConfig::Exp3(config) => config.variant.name(),
        }
    }
}

impl From<EtcConfig> for PolicyConfig {
    fn from(config: EtcConfig) -> Self {
        PolicyConfig::Etc(config)
    }
}

impl From<Exp3Config> for PolicyConfig {
    fn from(config: Exp3Config) -> Self {
        PolicyConfig::Exp3(config)
    }
}
