//! Reward generation.
//!
//! Every round draws one reward for *every* arm, so the oracle's reward and the
//! played arm's reward come from the same realization.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::arm::ArmMeans;
use crate::error::{BanditError, Result};

/// Noise standard deviation used by the Gaussian family unless overridden.
pub const DEFAULT_GAUSSIAN_STD: f64 = 0.25;

/// Reward distribution family shared by all arms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RewardDistribution {
    /// 0/1 rewards with success probability equal to the arm mean.
    #[default]
    Bernoulli,
    /// Arm mean plus zero-mean Gaussian noise, clipped to `[0, 1]`.
    Gaussian { std: f64 },
}

impl RewardDistribution {
    /// Gaussian rewards with the default noise level.
    pub fn gaussian() -> Self {
        RewardDistribution::Gaussian {
            std: DEFAULT_GAUSSIAN_STD,
        }
    }
}

impl FromStr for RewardDistribution {
    type Err = BanditError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "bin" | "bernoulli" => Ok(RewardDistribution::Bernoulli),
            "normal" | "gaussian" => Ok(RewardDistribution::gaussian()),
            _ => Err(BanditError::UnsupportedDistribution {
                tag: tag.to_string(),
            }),
        }
    }
}

impl fmt::Display for RewardDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardDistribution::Bernoulli => write!(f, "bernoulli"),
            RewardDistribution::Gaussian { std } => write!(f, "gaussian(std={std})"),
        }
    }
}

#[derive(Clone, Debug)]
enum Sampler {
    Bernoulli,
    Gaussian(Normal<f64>),
}

/// Draws reward vectors for a fixed distribution family.
///
/// Built once per policy; construction validates the distribution against
/// the arm means so sampling itself cannot fail.
#[derive(Clone, Debug)]
pub struct RewardSource {
    distribution: RewardDistribution,
    sampler: Sampler,
}

impl RewardSource {
    /// Validates `distribution` for `arms` and prepares the sampler.
    pub fn new(distribution: RewardDistribution, arms: &ArmMeans) -> Result<Self> {
        let sampler = match distribution {
            RewardDistribution::Bernoulli => {
                arms.ensure_probabilities()?;
                Sampler::Bernoulli
            }
            RewardDistribution::Gaussian { std } => {
                if !(std.is_finite() && std > 0.0) {
                    return Err(BanditError::invalid(format!(
                        "gaussian noise std must be positive and finite, got {std}"
                    )));
                }
                let normal = Normal::new(0.0, std)
                    .map_err(|e| BanditError::invalid(format!("gaussian noise: {e}")))?;
                Sampler::Gaussian(normal)
            }
        };
        Ok(Self {
            distribution,
            sampler,
        })
    }

    /// The configured distribution family.
    pub fn distribution(&self) -> RewardDistribution {
        self.distribution
    }

    /// Draws one reward per arm.
    pub fn sample(&self, means: &[f64], rng: &mut dyn rand::RngCore) -> Vec<f64> {
        match &self.sampler {
            Sampler::Bernoulli => means
                .iter()
                .map(|&p| if rng.random::<f64>() < p { 1.0 } else { 0.0 })
                .collect(),
            Sampler::Gaussian(noise) => means
                .iter()
                .map(|&mean| (mean + noise.sample(rng)).clamp(0.0, 1.0))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn arms(means: &[f64]) -> ArmMeans {
        ArmMeans::new(means.to_vec()).unwrap()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            "bin".parse::<RewardDistribution>().unwrap(),
            RewardDistribution::Bernoulli
        );
        assert_eq!(
            "normal".parse::<RewardDistribution>().unwrap(),
            RewardDistribution::Gaussian { std: 0.25 }
        );
        let err = "poisson".parse::<RewardDistribution>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported reward distribution: poisson");
    }

    #[test]
    fn test_bernoulli_rejects_out_of_range_means() {
        let result = RewardSource::new(RewardDistribution::Bernoulli, &arms(&[0.5, 1.5]));
        assert!(matches!(result, Err(BanditError::InvalidParameter { .. })));
    }

    #[test]
    fn test_gaussian_rejects_zero_std() {
        let result = RewardSource::new(RewardDistribution::Gaussian { std: 0.0 }, &arms(&[0.5]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bernoulli_draws_are_binary() {
        let source =
            RewardSource::new(RewardDistribution::Bernoulli, &arms(&[0.0, 0.3, 1.0])).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let rewards = source.sample(&[0.0, 0.3, 1.0], &mut rng);
            assert_eq!(rewards.len(), 3);
            assert_eq!(rewards[0], 0.0);
            assert_eq!(rewards[2], 1.0);
            assert!(rewards[1] == 0.0 || rewards[1] == 1.0);
        }
    }

    #[test]
    fn test_bernoulli_frequency_matches_mean() {
        let source = RewardSource::new(RewardDistribution::Bernoulli, &arms(&[0.3])).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let n = 20_000;
        let hits: f64 = (0..n).map(|_| source.sample(&[0.3], &mut rng)[0]).sum();
        assert!((hits / n as f64 - 0.3).abs() < 0.02);
    }

    #[test]
    fn test_gaussian_draws_are_clipped() {
        let means = [0.0, 0.5, 1.0];
        let source = RewardSource::new(RewardDistribution::gaussian(), &arms(&means)).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..500 {
            for reward in source.sample(&means, &mut rng) {
                assert!((0.0..=1.0).contains(&reward));
            }
        }
    }

    #[test]
    fn test_same_seed_same_rewards() {
        let means = [0.2, 0.7];
        let source = RewardSource::new(RewardDistribution::gaussian(), &arms(&means)).unwrap();
        let mut rng1 = rand::rngs::StdRng::seed_from_u64(11);
        let mut rng2 = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(source.sample(&means, &mut rng1), source.sample(&means, &mut rng2));
        }
    }
}
