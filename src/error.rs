use thiserror::Error;

/// Why a list of probabilities is not a usable distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionFault {
    #[error("rule {index} has probability {probability}, expected a finite value in (0, 1]")]
    NonPositiveProbability { index: usize, probability: f64 },

    #[error("probabilities sum to {total}, expected 1.0")]
    SumOutOfTolerance { total: f64 },
}

#[derive(Debug, Error)]
pub enum ChaosError {
    #[error("rule set must contain at least one rule")]
    EmptyRuleSet,

    #[error("invalid distribution: {0}")]
    InvalidDistribution(#[from] DistributionFault),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("render failed: {0}")]
    Render(String),
}

impl ChaosError {
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        ChaosError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChaosError>;
