//! Repeated, seeded simulation runs and their aggregation.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::error::{BanditError, Result};
use crate::policy::{Policy, PolicyConfig};

/// Drives one policy configuration through `repeats` independent runs of
/// `horizon` rounds each.
///
/// Repeat `j` seeds its generator with `seed + j` and builds the policy from
/// scratch, so any single repeat can be reproduced in isolation and repeats can
/// run in parallel.
///
/// # Examples
///
/// ```
/// use banditsim::prelude::*;
///
/// let simulation = Simulation::builder()
///     .policy(EtcConfig::new(vec![0.9, 0.1], 10))
///     .horizon(200)
///     .repeats(4)
///     .build()
///     .unwrap();
///
/// let matrix = simulation.run().unwrap();
/// assert_eq!(matrix.repeats(), 4);
/// assert_eq!(matrix.horizon(), 200);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Simulation {
    policy: PolicyConfig,
    horizon: usize,
    repeats: usize,
    seed: u64,
}

impl Simulation {
    /// Creates a simulation, validating the policy configuration up front.
    pub fn new(policy: PolicyConfig, horizon: usize, repeats: usize) -> Result<Self> {
        Self::builder()
            .policy(policy)
            .horizon(horizon)
            .repeats(repeats)
            .build()
    }

    /// Create a new builder for constructing a simulation
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::default()
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Base seed; repeat `j` uses `seed + j`.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs every repeat and collects their cumulative regret rows.
    ///
    /// Each repeat writes only its own row of the matrix.
    ///
    /// # Errors
    /// Fails with an error from a failing repeat.
    pub fn run(&self) -> Result<RegretMatrix> {
        log::info!(
            target: "banditsim",
            "running {} for {} repeats of {} rounds",
            self.policy.name(),
            self.repeats,
            self.horizon
        );

        let mut regret = Array2::<f64>::zeros((self.repeats, self.horizon));
        regret
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .try_for_each(|(j, mut row)| -> Result<()> {
                let cumulative = self.run_repeat(j)?;
                row.assign(&ArrayView1::from(cumulative.as_slice()));
                Ok(())
            })?;

        let matrix = RegretMatrix { regret };
        if let Some(summary) = matrix.summary() {
            log::info!(
                target: "banditsim",
                "{} finished: final mean cumulative regret {:.3} (std {:.3}), mean std {:.3}",
                self.policy.name(),
                summary.final_mean,
                summary.final_std,
                summary.mean_std
            );
        }
        Ok(matrix)
    }

    /// Runs repeat `j` alone and returns its cumulative regret per round.
    pub fn run_repeat(&self, j: usize) -> Result<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(j as u64));
        let mut policy = self.policy.build()?;
        run_policy(policy.as_mut(), self.horizon, &mut rng)?;
        log::debug!(
            target: "banditsim",
            "repeat {} of {}: cumulative regret {:.3}",
            j,
            self.policy.name(),
            policy.regret().total()
        );
        Ok(policy.regret().cumulative())
    }
}

/// Plays `horizon` rounds of `policy` with `rng`.
pub fn run_policy(
    policy: &mut dyn Policy,
    horizon: usize,
    rng: &mut dyn rand::RngCore,
) -> Result<()> {
    for _ in 0..horizon {
        policy.step(rng)?;
    }
    Ok(())
}

/// Builder for creating simulations with a fluent API
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    policy: Option<PolicyConfig>,
    horizon: Option<usize>,
    repeats: Option<usize>,
    seed: u64,
}

impl SimulationBuilder {
    /// Set the policy configuration
    pub fn policy(mut self, policy: impl Into<PolicyConfig>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set the number of rounds per run
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the number of independent runs
    pub fn repeats(mut self, repeats: usize) -> Self {
        self.repeats = Some(repeats);
        self
    }

    /// Set the base seed (defaults to 0)
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the simulation
    pub fn build(self) -> Result<Simulation> {
        let policy = self.policy.ok_or(BanditError::BuilderError {
            message: "policy not specified".into(),
        })?;
        let horizon = self.horizon.ok_or(BanditError::BuilderError {
            message: "horizon not specified".into(),
        })?;
        let repeats = self.repeats.unwrap_or(1);

        if horizon == 0 {
            return Err(BanditError::invalid("horizon must be at least 1"));
        }
        if repeats == 0 {
            return Err(BanditError::invalid("repeats must be at least 1"));
        }
        // Surface configuration errors before any run starts.
        policy.build()?;

        Ok(Simulation {
            policy,
            horizon,
            repeats,
            seed: self.seed,
        })
    }
}

/// Cumulative regret of every run: rows are runs, columns are rounds.
#[derive(Clone, Debug, PartialEq)]
pub struct RegretMatrix {
    regret: Array2<f64>,
}

impl RegretMatrix {
    /// Wraps externally produced rows, checking they all span `horizon` rounds.
    pub fn from_rows(rows: Vec<Vec<f64>>, horizon: usize) -> Result<Self> {
        if let Some((ix, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != horizon) {
            return Err(BanditError::DimensionMismatch {
                message: format!("row {ix} has {} rounds, expected {horizon}", row.len()),
            });
        }
        let repeats = rows.len();
        let regret = Array2::from_shape_vec((repeats, horizon), rows.concat()).map_err(|e| {
            BanditError::DimensionMismatch {
                message: e.to_string(),
            }
        })?;
        Ok(Self { regret })
    }

    /// Number of runs.
    pub fn repeats(&self) -> usize {
        self.regret.nrows()
    }

    /// Number of rounds per run.
    pub fn horizon(&self) -> usize {
        self.regret.ncols()
    }

    /// The whole runs × rounds matrix.
    pub fn as_array(&self) -> ArrayView2<'_, f64> {
        self.regret.view()
    }

    pub fn row(&self, j: usize) -> Option<ArrayView1<'_, f64>> {
        (j < self.repeats()).then(|| self.regret.row(j))
    }

    /// Mean cumulative regret per round across runs.
    ///
    /// Empty when the matrix holds no runs.
    pub fn mean(&self) -> Array1<f64> {
        self.regret
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(0))
    }

    /// Population standard deviation of cumulative regret per round.
    pub fn std(&self) -> Array1<f64> {
        if self.repeats() == 0 {
            return Array1::zeros(0);
        }
        self.regret.std_axis(Axis(0), 0.0)
    }

    /// `(mean - k*std, mean + k*std)` per round.
    pub fn band(&self, k: f64) -> (Array1<f64>, Array1<f64>) {
        let mean = self.mean();
        let spread = self.std() * k;
        (&mean - &spread, &mean + &spread)
    }

    /// Scalar summary, or `None` for an empty matrix.
    pub fn summary(&self) -> Option<RegretSummary> {
        let mean = self.mean();
        let std = self.std();
        let final_mean = *mean.iter().next_back()?;
        let final_std = *std.iter().next_back()?;
        let mean_std = std.mean()?;
        Some(RegretSummary {
            final_mean,
            final_std,
            mean_std,
        })
    }
}

/// Headline numbers of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegretSummary {
    /// Mean cumulative regret after the last round.
    pub final_mean: f64,
    /// Standard deviation of cumulative regret after the last round.
    pub final_std: f64,
    /// Per-round standard deviation averaged over all rounds.
    pub mean_std: f64,
}
