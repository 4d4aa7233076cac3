//! Simulating bandit trials and aggregating them into learning curves.
mod batch;
mod trial;

pub use batch::{run_batch, run_batch_parallel, run_batch_resampling};
pub use trial::run_trial;

use crate::error::ConfigError;
use crate::estimates::StepSize;
use crate::policy::SelectionPolicy;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Number of action-reward steps.
    pub num_steps: usize,
    /// Value estimate assigned to every arm before any pulls.
    ///
    /// Set above the achievable rewards for optimistic initialization, which
    /// drives early exploration even under a greedy policy.
    pub initial_value: f64,
    /// How actions are selected from the value estimates.
    pub policy: SelectionPolicy,
    /// How rewards are folded into the value estimates.
    pub step_size: StepSize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            num_steps: 1000,
            initial_value: 0.0,
            policy: SelectionPolicy::default(),
            step_size: StepSize::default(),
        }
    }
}

impl TrialConfig {
    /// Check the trial parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        if !self.initial_value.is_finite() {
            return Err(ConfigError::NonFiniteInitialValue(self.initial_value));
        }
        self.policy.validate()?;
        self.step_size.validate()
    }
}

/// Configuration of a batch of independent trials on one task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of independent trials to average over.
    pub num_trials: usize,
    /// Configuration shared by every trial in the batch.
    pub trial: TrialConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_trials: 100,
            trial: TrialConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Check the batch parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        self.trial.validate()
    }
}

/// Per-step outcomes of a single trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Running mean of all rewards received so far, after each step.
    pub mean_rewards: Vec<f64>,
    /// Whether the pulled arm had the highest true mean, for each step.
    pub optimal_actions: Vec<bool>,
}

impl TrialRecord {
    pub(super) fn with_capacity(num_steps: usize) -> Self {
        Self {
            mean_rewards: Vec::with_capacity(num_steps),
            optimal_actions: Vec::with_capacity(num_steps),
        }
    }

    /// The number of recorded steps.
    pub fn num_steps(&self) -> usize {
        self.mean_rewards.len()
    }
}

/// Mean learning curves over a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurves {
    /// Mean over trials of the running-average reward, for each step.
    pub mean_reward: Array1<f64>,
    /// Fraction of trials that pulled the best arm, for each step.
    pub optimal_action_rate: Array1<f64>,
}

impl LearningCurves {
    /// The number of steps in each curve.
    pub fn num_steps(&self) -> usize {
        self.mean_reward.len()
    }

    /// The running-average reward at the last step, if any.
    pub fn final_mean_reward(&self) -> Option<f64> {
        self.mean_reward.last().copied()
    }

    /// The fraction of optimal pulls at the last step, if any.
    pub fn final_optimal_action_rate(&self) -> Option<f64> {
        self.optimal_action_rate.last().copied()
    }
}

impl fmt::Display for LearningCurves {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} steps; final mean reward {:.3}; final optimal action rate {:.3}",
            self.num_steps(),
            self.final_mean_reward().unwrap_or(f64::NAN),
            self.final_optimal_action_rate().unwrap_or(f64::NAN),
        )
    }
}
