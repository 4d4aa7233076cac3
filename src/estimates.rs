//! Action-value estimation
use crate::error::ConfigError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Weight given to each new reward when updating an action's value estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepSize {
    /// Weight `1 / N[a]` where `N[a]` counts updates of the action.
    ///
    /// The estimate equals the arithmetic mean of all observed rewards,
    /// which converges on the true mean of a stationary arm.
    SampleAverage,
    /// A fixed weight in `(0, 1]`.
    ///
    /// Gives exponentially more influence to recent rewards; used to track
    /// nonstationary arms.
    Constant(f64),
}

impl Default for StepSize {
    fn default() -> Self {
        Self::SampleAverage
    }
}

impl StepSize {
    /// Check the step size parameter.
    pub fn validate(self) -> Result<(), ConfigError> {
        match self {
            Self::SampleAverage => Ok(()),
            Self::Constant(alpha) if alpha > 0.0 && alpha <= 1.0 => Ok(()),
            Self::Constant(alpha) => Err(ConfigError::ConstantStepSize(alpha)),
        }
    }

    /// The update weight once the action's count includes the new reward.
    fn weight(self, count: u64) -> f64 {
        match self {
            Self::SampleAverage => (count as f64).recip(),
            Self::Constant(alpha) => alpha,
        }
    }
}

/// Per-action value estimates and update counts.
///
/// State lives for a single trial: create a fresh instance (or `reset`) for
/// each trial so that no learning leaks across trials.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEstimates {
    /// The estimated value of each action.
    values: Array1<f64>,
    /// The number of updates applied to each action.
    counts: Array1<u64>,
    /// Value estimate assigned to every action before any updates.
    initial_value: f64,
}

impl ActionEstimates {
    /// Create estimates for `num_actions` actions, all starting at `initial_value`.
    pub fn new(num_actions: usize, initial_value: f64) -> Self {
        Self {
            values: Array1::from_elem(num_actions, initial_value),
            counts: Array1::zeros(num_actions),
            initial_value,
        }
    }

    /// The number of actions.
    pub fn num_actions(&self) -> usize {
        self.values.len()
    }

    /// The estimated value of each action.
    pub const fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// The number of updates applied to each action.
    pub const fn counts(&self) -> &Array1<u64> {
        &self.counts
    }

    /// The total number of updates applied across all actions.
    pub fn num_updates(&self) -> u64 {
        self.counts.sum()
    }

    /// Incorporate an observed reward into the chosen action's estimate.
    ///
    /// The action's count is incremented first, so a sample-average update
    /// weights the first reward by 1 (discarding the initial value) and the
    /// `n`-th by `1/n`.
    ///
    /// # Panics
    /// If `action >= self.num_actions()`.
    pub fn update(&mut self, action: usize, reward: f64, step_size: StepSize) {
        self.counts[action] += 1;
        let weight = step_size.weight(self.counts[action]);
        self.values[action] += weight * (reward - self.values[action]);
    }

    /// Forget all updates: values back to the initial value, counts to zero.
    pub fn reset(&mut self) {
        self.values.fill(self.initial_value);
        self.counts.fill(0);
    }
}


#[cfg(test)]
mod action_estimates {
    use super::*;

    #[test]
    fn sample_average_equals_running_mean() {
        let rewards = [2.0, -1.0, 0.5, 3.25];
        let mut estimates = ActionEstimates::new(3, 100.0);
        for (i, &reward) in rewards.iter().enumerate() {
            estimates.update(1, reward, StepSize::SampleAverage);
            let mean: f64 = rewards[..=i].iter().sum::<f64>() / (i + 1) as f64;
            assert!((estimates.values()[1] - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn first_sample_average_update_discards_initial_value() {
        let mut estimates = ActionEstimates::new(2, 5.0);
        estimates.update(0, -3.0, StepSize::SampleAverage);
        assert_eq!(estimates.values()[0], -3.0);
        // The untouched action keeps its initial value.
        assert_eq!(estimates.values()[1], 5.0);
    }

    #[test]
    fn constant_step_size_is_exponentially_recency_weighted() {
        let alpha = 0.25;
        let initial = 1.0;
        let rewards = [4.0, -2.0, 0.0];
        let mut estimates = ActionEstimates::new(1, initial);
        for &reward in &rewards {
            estimates.update(0, reward, StepSize::Constant(alpha));
        }
        let mut expected = initial;
        for &reward in &rewards {
            expected += alpha * (reward - expected);
        }
        assert!((estimates.values()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn counts_track_updates_per_action() {
        let mut estimates = ActionEstimates::new(3, 0.0);
        estimates.update(0, 1.0, StepSize::SampleAverage);
        estimates.update(2, 1.0, StepSize::SampleAverage);
        estimates.update(2, 1.0, StepSize::SampleAverage);
        assert_eq!(estimates.counts().to_vec(), vec![1, 0, 2]);
        assert_eq!(estimates.num_updates(), 3);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut estimates = ActionEstimates::new(2, 1.5);
        estimates.update(0, 10.0, StepSize::SampleAverage);
        estimates.update(1, -10.0, StepSize::Constant(0.5));
        estimates.reset();
        assert_eq!(estimates, ActionEstimates::new(2, 1.5));
    }

    #[test]
    #[should_panic]
    fn update_out_of_range_panics() {
        let mut estimates = ActionEstimates::new(2, 0.0);
        estimates.update(2, 1.0, StepSize::SampleAverage);
    }
}
