//! Error types for the banditsim library.

use thiserror::Error;

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// No arms were configured.
    #[error("no arms available")]
    NoArmsAvailable,

    /// Mismatch in the dimensions of input data.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The reward distribution tag is not recognised.
    #[error("unsupported reward distribution: {tag}")]
    UnsupportedDistribution { tag: String },

    /// The algorithm variant tag is not recognised.
    #[error("unsupported algorithm: {tag}")]
    UnsupportedAlgorithm { tag: String },

    /// A numerical invariant was violated during a run.
    #[error("numerical error at round {round}: {message}")]
    NumericalError { round: usize, message: String },

    /// Builder configuration error.
    #[error("builder error: {message}")]
    BuilderError { message: String },
}

impl BanditError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BanditError::InvalidParameter {
            message: message.into(),
        }
    }
}
