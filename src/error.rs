//! Error type
use thiserror::Error;

/// Error in a bandit, policy, or simulation configuration.
///
/// Configurations are validated up front, before any sampling happens, so
/// every run that starts can run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("must have at least one arm")]
    NoArms,
    #[error("must run at least one step per trial")]
    NoSteps,
    #[error("must run at least one trial")]
    NoTrials,
    #[error("must use at least one worker thread")]
    NoThreads,
    #[error("exploration probability must lie in [0, 1]: {0}")]
    Epsilon(f64),
    #[error("constant step size must lie in (0, 1]: {0}")]
    ConstantStepSize(f64),
    #[error("confidence bonus scale must be finite and non-negative: {0}")]
    UcbScale(f64),
    #[error("arm mean must be finite: {0}")]
    NonFiniteMean(f64),
    #[error("prior mean must be finite: {0}")]
    NonFinitePriorMean(f64),
    #[error("prior standard deviation must be finite and non-negative: {0}")]
    PriorStddev(f64),
    #[error("initial value estimate must be finite: {0}")]
    NonFiniteInitialValue(f64),
}
