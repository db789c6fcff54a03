//! banditsim: regret simulation for multi-armed bandit policies.
//!
//! The crate plays bandit policies against arms with known true means and
//! measures their cumulative regret against an oracle that always pulls the
//! best arm. Runs are repeated with deterministic per-repeat seeds and
//! aggregated into mean and standard deviation curves.
//!
//! Two policy families are provided:
//!
//! - **Explore-Then-Commit** ([`policies::Etc`]): round-robin exploration for
//!   `m` pulls per arm, then a permanent commitment to the empirical best arm.
//! - **EXP3** ([`policies::Exp3`]): exponential weights with the plain,
//!   implicit-exploration, clipped or soft-clipped loss estimator, and an
//!   optional mid-run shift of one arm's mean.
//!
//! # Quick Start
//!
//! ```
//! use banditsim::prelude::*;
//!
//! let config = Exp3Config::new(vec![0.5, 0.6, 0.4], 0.05)
//!     .variant(Exp3Variant::ImplicitExploration)
//!     .distribution(RewardDistribution::gaussian());
//!
//! let simulation = Simulation::builder()
//!     .policy(config)
//!     .horizon(500)
//!     .repeats(8)
//!     .seed(0)
//!     .build()
//!     .unwrap();
//!
//! let matrix = simulation.run().unwrap();
//! let summary = matrix.summary().unwrap();
//! println!("final regret {:.2} ± {:.2}", summary.final_mean, summary.final_std);
//! ```
//!
//! # Stepping a policy by hand
//!
//! ```
//! use banditsim::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut policy = PolicyConfig::from(EtcConfig::new(vec![0.9, 0.1], 5)).build().unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! for t in 0..10 {
//!     let step = policy.step(&mut rng).unwrap();
//!     assert_eq!(step.arm, t % 2);
//! }
//! assert_eq!(policy.regret().len(), 10);
//! ```

mod arm;
mod error;
pub mod policies;
mod policy;
mod regret;
mod reward;
mod simulation;
pub mod stats;

// Re-export main types
pub use arm::{ArmMeans, argmax};
pub use error::{BanditError, Result};
pub use policy::{Policy, PolicyConfig, Step};
pub use regret::RegretLog;
pub use reward::{DEFAULT_GAUSSIAN_STD, RewardDistribution, RewardSource};
pub use simulation::{RegretMatrix, RegretSummary, Simulation, SimulationBuilder, run_policy};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use banditsim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::policies::{Etc, EtcConfig, Exp3, Exp3Config, Exp3Variant, MeanShift};
    pub use crate::{
        BanditError, Policy, PolicyConfig, RegretLog, RegretMatrix, RegretSummary, Result,
        RewardDistribution, Simulation, Step,
    };
}
