use rand::Rng;

use super::estimator::{Exp3Variant, LossEstimator};
use crate::arm::ArmMeans;
use crate::error::{BanditError, Result};
use crate::policy::{Policy, Step};
use crate::regret::RegretLog;
use crate::reward::{RewardDistribution, RewardSource};

/// Allowed deviation of the sampling distribution's total mass from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A one-time change of one arm's true mean.
///
/// The shift fires on the first round `t` with `t > after_round`, before that
/// round's rewards are drawn, and the oracle arm is recomputed from the new
/// means.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeanShift {
    /// Last round played with the original means.
    pub after_round: usize,
    /// Arm whose mean moves.
    pub arm: usize,
    /// Amount added to that arm's mean.
    pub delta: f64,
}

/// Configuration of an EXP3-family policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exp3Config {
    /// True mean of every arm.
    pub means: Vec<f64>,
    /// Exponential-weights learning rate (eta).
    pub learning_rate: f64,
    /// Loss estimator.
    pub variant: Exp3Variant,
    /// Reward distribution of every arm.
    pub distribution: RewardDistribution,
    /// Optional non-stationary event.
    pub shift: Option<MeanShift>,
    /// Expected arm count; checked against `means` when set.
    pub num_arms: Option<usize>,
}

impl Exp3Config {
    /// Plain EXP3 over Bernoulli arms.
    pub fn new(means: Vec<f64>, learning_rate: f64) -> Self {
        Self {
            means,
            learning_rate,
            variant: Exp3Variant::default(),
            distribution: RewardDistribution::default(),
            shift: None,
            num_arms: None,
        }
    }

    /// Sets the loss estimator.
    #[must_use]
    pub fn variant(mut self, variant: Exp3Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the reward distribution.
    #[must_use]
    pub fn distribution(mut self, distribution: RewardDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Schedules a mean shift.
    #[must_use]
    pub fn shift(mut self, shift: MeanShift) -> Self {
        self.shift = Some(shift);
        self
    }

    /// Declares the number of arms `means` must hold.
    #[must_use]
    pub fn num_arms(mut self, num_arms: usize) -> Self {
        self.num_arms = Some(num_arms);
        self
    }
}

/// EXP3 with a pluggable loss estimator
///
/// Each round the sampling distribution is recomputed from the cumulative
/// loss estimates,
///
/// `P_i = exp(-eta * L_i) / sum_j exp(-eta * L_j)`,
///
/// an arm is drawn from it, and only the played arm's loss estimate is
/// updated. The exponent is shifted by the smallest loss before
/// exponentiating, so the largest weight is always exactly 1 and large losses
/// cannot overflow.
#[derive(Debug)]
pub struct Exp3 {
    initial_arms: ArmMeans,
    arms: ArmMeans,
    learning_rate: f64,
    variant: Exp3Variant,
    estimator: Box<dyn LossEstimator>,
    source: RewardSource,
    shift: Option<MeanShift>,
    shifted: bool,
    round: usize,
    losses: Vec<f64>,
    probabilities: Vec<f64>,
    regret: RegretLog,
}

impl Exp3 {
    /// Builds the policy with uniform probabilities and zero losses.
    pub fn new(config: Exp3Config) -> Result<Self> {
        let arms = match config.num_arms {
            Some(num_arms) => ArmMeans::with_len(config.means, num_arms)?,
            None => ArmMeans::new(config.means)?,
        };
        if !(config.learning_rate.is_finite() && config.learning_rate > 0.0) {
            return Err(BanditError::invalid(format!(
                "learning rate must be positive and finite, got {}",
                config.learning_rate
            )));
        }
        let source = RewardSource::new(config.distribution, &arms)?;

        if let Some(shift) = config.shift {
            if shift.arm >= arms.len() {
                return Err(BanditError::invalid(format!(
                    "shifted arm {} out of range for {} arms",
                    shift.arm,
                    arms.len()
                )));
            }
            if !shift.delta.is_finite() {
                return Err(BanditError::invalid("mean shift delta must be finite"));
            }
            // The post-shift means must be valid for the distribution too.
            let mut shifted = arms.clone();
            shifted.shift(shift.arm, shift.delta);
            RewardSource::new(config.distribution, &shifted)?;
        }

        let k = arms.len();
        Ok(Self {
            initial_arms: arms.clone(),
            arms,
            learning_rate: config.learning_rate,
            variant: config.variant,
            estimator: config.variant.estimator(config.learning_rate),
            source,
            shift: config.shift,
            shifted: false,
            round: 0,
            losses: vec![0.0; k],
            probabilities: vec![1.0 / k as f64; k],
            regret: RegretLog::new(),
        })
    }

    /// Loss estimator in use.
    pub fn variant(&self) -> Exp3Variant {
        self.variant
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Sampling distribution used for the most recent round (uniform before
    /// the first round).
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Cumulative loss estimate of every arm.
    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    /// Whether the scheduled mean shift has been applied.
    pub fn shift_applied(&self) -> bool {
        self.shifted
    }

    fn apply_shift(&mut self) {
        let Some(shift) = self.shift else {
            return;
        };
        if self.shifted || self.round <= shift.after_round {
            return;
        }
        let previous = self.arms.best_arm();
        self.arms.shift(shift.arm, shift.delta);
        self.shifted = true;
        log::debug!(
            target: "banditsim",
            "mean of arm {} shifted by {} at round {}; best arm {} -> {}",
            shift.arm,
            shift.delta,
            self.round,
            previous,
            self.arms.best_arm()
        );
    }

    fn update_probabilities(&mut self) -> Result<()> {
        let eta = self.learning_rate;
        let min_loss = self.losses.iter().copied().fold(f64::INFINITY, f64::min);

        let mut total = 0.0;
        for (p, &loss) in self.probabilities.iter_mut().zip(&self.losses) {
            *p = (-eta * (loss - min_loss)).exp();
            total += *p;
        }
        for p in &mut self.probabilities {
            *p /= total;
        }

        let mass: f64 = self.probabilities.iter().sum();
        let malformed = self
            .probabilities
            .iter()
            .position(|p| !p.is_finite() || *p < 0.0);
        if let Some(arm) = malformed {
            return Err(BanditError::NumericalError {
                round: self.round,
                message: format!("probability of arm {arm} is {}", self.probabilities[arm]),
            });
        }
        if (mass - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(BanditError::NumericalError {
                round: self.round,
                message: format!("probabilities sum to {mass}"),
            });
        }
        Ok(())
    }

    /// Categorical draw from the current probabilities.
    fn sample_arm(&self, rng: &mut dyn rand::RngCore) -> usize {
        let r: f64 = rng.random();
        let mut cdf = 0.0;
        for (arm, p) in self.probabilities.iter().enumerate() {
            cdf += p;
            if r < cdf {
                return arm;
            }
        }
        // Rounding left r above the final cdf; take the last arm with mass.
        self.probabilities
            .iter()
            .rposition(|p| *p > 0.0)
            .unwrap_or(self.probabilities.len() - 1)
    }
}

impl Policy for Exp3 {
    fn name(&self) -> &'static str {
        self.variant.name()
    }

    fn step(&mut self, rng: &mut dyn rand::RngCore) -> Result<Step> {
        self.apply_shift();
        self.update_probabilities()?;

        let arm = self.sample_arm(rng);
        let rewards = self.source.sample(self.arms.means(), rng);
        let oracle_arm = self.arms.best_arm();

        let reward = rewards[arm];
        let oracle_reward = rewards[oracle_arm];
        let regret = oracle_reward - reward;
        self.regret.record(regret);

        self.losses[arm] += self.estimator.estimate(reward, self.probabilities[arm]);

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
        let k = self.arms.len();
        self.arms = self.initial_arms.clone();
        self.shifted = false;
        self.round = 0;
        self.losses.fill(0.0);
        self.probabilities.fill(1.0 / k as f64);
        self.regret.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn assert_simplex(probabilities: &[f64]) {
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < PROBABILITY_TOLERANCE, "sum={sum}");
        assert!(probabilities.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_initial_state_is_uniform() {
        let policy = Exp3::new(Exp3Config::new(vec![0.5; 4], 0.1)).unwrap();
        assert_eq!(policy.probabilities(), &[0.25; 4]);
        assert_eq!(policy.losses(), &[0.0; 4]);
        assert_eq!(policy.round(), 0);
    }

    #[test]
    fn test_only_played_arm_loss_changes() {
        let mut policy = Exp3::new(Exp3Config::new(vec![0.3, 0.6, 0.9], 0.1)).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let before = policy.losses().to_vec();
            let step = policy.step(&mut rng).unwrap();
            let p = policy.probabilities()[step.arm];
            for (arm, (old, new)) in before.iter().zip(policy.losses()).enumerate() {
                if arm == step.arm {
                    assert_abs_diff_eq!(new - old, (1.0 - step.reward) / p, epsilon = 1e-9);
                } else {
                    assert_eq!(old, new);
                }
            }
        }
    }

    #[test]
    fn test_probabilities_follow_exponential_weights() {
        let mut policy = Exp3::new(Exp3Config::new(vec![0.2, 0.8], 0.5)).unwrap();
        policy.losses = vec![2.0, 0.0];
        policy.update_probabilities().unwrap();
        let w = (-0.5f64 * 2.0).exp();
        assert_abs_diff_eq!(policy.probabilities()[0], w / (1.0 + w), epsilon = 1e-12);
        assert_abs_diff_eq!(policy.probabilities()[1], 1.0 / (1.0 + w), epsilon = 1e-12);
    }

    #[test]
    fn test_huge_losses_do_not_overflow() {
        let mut policy = Exp3::new(Exp3Config::new(vec![0.5; 3], 1.0)).unwrap();
        policy.losses = vec![-1e6, -1e6 + 1.0, 1e6];
        policy.update_probabilities().unwrap();
        assert_simplex(policy.probabilities());
        assert!(policy.probabilities()[0] > policy.probabilities()[1]);
        assert_eq!(policy.probabilities()[2], 0.0);
    }

    #[test]
    fn test_categorical_sampling_concentrates_on_low_loss() {
        let mut policy = Exp3::new(Exp3Config::new(vec![0.5; 3], 1.0)).unwrap();
        policy.losses = vec![50.0, 0.0, 50.0];
        policy.update_probabilities().unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(policy.sample_arm(&mut rng), 1);
        }
    }

    #[test]
    fn test_shift_fires_once_after_threshold() {
        let shift = MeanShift {
            after_round: 10,
            arm: 2,
            delta: 0.4,
        };
        let mut policy =
            Exp3::new(Exp3Config::new(vec![0.5, 0.6, 0.4], 0.05).shift(shift)).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(8);
        for t in 0..30 {
            let step = policy.step(&mut rng).unwrap();
            let expected = if t > 10 { 2 } else { 1 };
            assert_eq!(step.oracle_arm, expected, "round {t}");
        }
        assert!(policy.shift_applied());
        assert_abs_diff_eq!(policy.arms().means()[2], 0.8, epsilon = 1e-12);

        policy.reset();
        assert!(!policy.shift_applied());
        assert_eq!(policy.best_arm(), 1);
        assert_abs_diff_eq!(policy.arms().means()[2], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(Exp3::new(Exp3Config::new(vec![0.5, 0.5], 0.0)).is_err());
        assert!(Exp3::new(Exp3Config::new(vec![0.5, 0.5], f64::NAN)).is_err());
        let out_of_range = MeanShift {
            after_round: 0,
            arm: 2,
            delta: 0.1,
        };
        assert!(Exp3::new(Exp3Config::new(vec![0.5, 0.5], 0.1).shift(out_of_range)).is_err());
        let too_far = MeanShift {
            after_round: 0,
            arm: 0,
            delta: 0.7,
        };
        assert!(Exp3::new(Exp3Config::new(vec![0.5, 0.5], 0.1).shift(too_far)).is_err());
        assert!(
            Exp3::new(
                Exp3Config::new(vec![0.5, 0.5], 0.1)
                    .shift(too_far)
                    .distribution(RewardDistribution::gaussian())
            )
            .is_ok()
        );
    }

    #[test]
    fn test_non_finite_probabilities_abort_the_round() {
        let mut policy = Exp3::new(Exp3Config::new(vec![0.4, 0.6], 0.1)).unwrap();
        policy.losses = vec![f64::NAN, 0.0];
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);

        let err = policy.step(&mut rng).unwrap_err();
        assert!(matches!(err, BanditError::NumericalError { round: 0, .. }));
        assert_eq!(policy.round(), 0);
        assert!(policy.regret().is_empty());
    }

    #[test]
    fn test_declared_arm_count_must_match() {
        let err = Exp3::new(Exp3Config::new(vec![0.5; 3], 0.1).num_arms(4)).unwrap_err();
        assert!(matches!(err, BanditError::DimensionMismatch { .. }));
        assert!(Exp3::new(Exp3Config::new(vec![0.5; 3], 0.1).num_arms(3)).is_ok());
    }

    proptest! {
        #[test]
        fn probabilities_stay_on_the_simplex(
            seed in any::<u64>(),
            lr in 1e-3f64..2.0,
            variant_ix in 0usize..4,
            k in 2usize..8,
            rounds in 1usize..300,
        ) {
            let means: Vec<f64> = (0..k).map(|i| (i as f64 + 0.5) / k as f64).collect();
            let config = Exp3Config::new(means, lr).variant(Exp3Variant::ALL[variant_ix]);
            let mut policy = Exp3::new(config).unwrap();
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            for _ in 0..rounds {
                let step = policy.step(&mut rng).unwrap();
                prop_assert!(step.arm < k);
                let sum: f64 = policy.probabilities().iter().sum();
                prop_assert!((sum - 1.0).abs() < PROBABILITY_TOLERANCE, "sum={}", sum);
                prop_assert!(policy.probabilities().iter().all(|p| *p >= 0.0 && p.is_finite()));
            }
            prop_assert_eq!(policy.regret().len(), rounds);
        }
    }
}
