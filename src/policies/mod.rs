//! Simulated bandit policies
//!
//! - [`Etc`]: Explore-Then-Commit, round-robin exploration followed by a
//!   permanent commitment to the empirically best arm.
//! - [`Exp3`]: exponential weights over importance-weighted loss estimates,
//!   with the estimator chosen by [`Exp3Variant`].

mod estimator;
mod etc;
mod exp3;

pub use estimator::{
    Clipped, Exp3Variant, ImplicitExploration, ImportanceWeighted, LossEstimator, SoftClipped,
};
pub use etc::{Etc, EtcConfig};
pub use exp3::{Exp3, Exp3Config, MeanShift, PROBABILITY_TOLERANCE};
