//! A k-armed bandit simulation testbed.
//!
//! Pits action-selection policies (greedy, epsilon-greedy, upper confidence
//! bound) against sets of Gaussian arms and averages many independent trials
//! into learning curves.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::for_kv_map)] // part of warn(clippy::all), specifically style?
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)] // also triggered by macro expansions
pub mod bandits;
mod error;
pub mod estimates;
pub mod logging;
pub mod policy;
pub mod simulation;
pub mod utils;

pub use bandits::{Bandit, DeterministicBandit, GaussianBandit, NormalPriorBandits};
pub use error::ConfigError;
pub use estimates::{ActionEstimates, StepSize};
pub use policy::SelectionPolicy;
pub use simulation::{
    run_batch, run_batch_parallel, run_batch_resampling, run_trial, BatchConfig, LearningCurves,
    TrialConfig, TrialRecord,
};

/// Pseudo-random number generator used by all sampling operations.
///
/// ChaCha with a reduced round count: fast, seedable, and identical streams
/// on every platform.
pub type Prng = rand_chacha::ChaCha8Rng;
