use crate::arm::{ArmMeans, argmax};
use crate::error::{BanditError, Result};
use crate::policy::{Policy, Step};
use crate::regret::RegretLog;
use crate::reward::{RewardDistribution, RewardSource};

/// Configuration of an Explore-Then-Commit policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EtcConfig {
    /// True mean of every arm.
    pub means: Vec<f64>,
    /// Round-robin pulls per arm before committing (m).
    pub explore_steps: usize,
    /// Reward distribution of every arm.
    pub distribution: RewardDistribution,
    /// Expected arm count; checked against `means` when set.
    pub num_arms: Option<usize>,
}

impl EtcConfig {
    /// Bernoulli-reward ETC exploring each arm `explore_steps` times.
    pub fn new(means: Vec<f64>, explore_steps: usize) -> Self {
        Self {
            means,
            explore_steps,
            distribution: RewardDistribution::default(),
            num_arms: None,
        }
    }

    /// Sets the reward distribution.
    #[must_use]
    pub fn distribution(mut self, distribution: RewardDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Declares the number of arms `means` must hold.
    #[must_use]
    pub fn num_arms(mut self, num_arms: usize) -> Self {
        self.num_arms = Some(num_arms);
        self
    }
}

/// Explore-Then-Commit policy
///
/// For the first `H = m * k` rounds the arms are played round-robin
/// (`arm = t mod k`) and their empirical means are kept by incremental
/// averaging. At round `H` the policy commits to the arm with the highest
/// empirical mean (lowest index on ties) and plays it for the rest of the run;
/// statistics are frozen from then on.
///
/// With `m = 0` there is no exploration: the commit happens at round 0 over an
/// all-zero mean array and therefore always picks arm 0.
#[derive(Clone, Debug)]
pub struct Etc {
    arms: ArmMeans,
    explore_steps: usize,
    explore_horizon: usize,
    source: RewardSource,
    round: usize,
    empirical_means: Vec<f64>,
    pulls: Vec<usize>,
    committed: Option<usize>,
    regret: RegretLog,
}

impl Etc {
    /// Builds the policy, validating the arm means against the distribution.
    pub fn new(config: EtcConfig) -> Result<Self> {
        let arms = match config.num_arms {
            Some(num_arms) => ArmMeans::with_len(config.means, num_arms)?,
            None => ArmMeans::new(config.means)?,
        };
        let source = RewardSource::new(config.distribution, &arms)?;
        let k = arms.len();
        let explore_horizon = config.explore_steps.checked_mul(k).ok_or_else(|| {
            BanditError::invalid(format!(
                "exploration budget {} over {k} arms overflows the round counter",
                config.explore_steps
            ))
        })?;
        Ok(Self {
            arms,
            explore_steps: config.explore_steps,
            explore_horizon,
            source,
            round: 0,
            empirical_means: vec![0.0; k],
            pulls: vec![0; k],
            committed: None,
            regret: RegretLog::new(),
        })
    }

    /// Length of the exploration phase (`m * k`).
    pub fn explore_horizon(&self) -> usize {
        self.explore_horizon
    }

    /// Round-robin pulls per arm (m).
    pub fn explore_steps(&self) -> usize {
        self.explore_steps
    }

    /// Empirical mean of every arm.
    pub fn empirical_means(&self) -> &[f64] {
        &self.empirical_means
    }

    /// Exploration pulls of every arm.
    pub fn pulls(&self) -> &[usize] {
        &self.pulls
    }

    /// The arm committed to, once the exploration phase is over.
    pub fn committed_arm(&self) -> Option<usize> {
        self.committed
    }

    fn select(&mut self) -> usize {
        if self.round < self.explore_horizon {
            return self.round % self.arms.len();
        }
        match self.committed {
            Some(arm) => arm,
            None => {
                let arm = argmax(&self.empirical_means);
                log::debug!(
                    target: "banditsim",
                    "etc committed to arm {} at round {} (empirical means {:?})",
                    arm,
                    self.round,
                    self.empirical_means
                );
                self.committed = Some(arm);
                arm
            }
        }
    }
}

impl Policy for Etc {
    fn name(&self) -> &'static str {
        "etc"
    }

    fn step(&mut self, rng: &mut dyn rand::RngCore) -> Result<Step> {
        let rewards = self.source.sample(self.arms.means(), rng);
        let arm = self.select();
        let oracle_arm = self.arms.best_arm();

        let reward = rewards[arm];
        let oracle_reward = rewards[oracle_arm];
        let regret = oracle_reward - reward;
        self.regret.record(regret);

        if self.round < self.explore_horizon {
            let n = self.pulls[arm] as f64;
            let mean = &mut self.empirical_means[arm];
            *mean = *mean * (n / (n + 1.0)) + reward / (n + 1.0);
            self.pulls[arm] += 1;
        }

        let step = Step {
            round: self.round,
            arm,
            oracle_arm,
            reward,
            oracle_reward,
            regret,
        };
        self.round += 1;
        Ok(step)
    }

    fn round(&self) -> usize {
        self.round
    }

    fn arms(&self) -> &ArmMeans {
        &self.arms
    }

    fn regret(&self) -> &RegretLog {
        &self.regret
    }

    fn reset(&mut self) {
        self.round = 0;
        self.empirical_means.fill(0.0);
        self.pulls.fill(0);
        self.committed = None;
        self.regret.clear();
    }
}
