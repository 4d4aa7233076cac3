//! Bandit arm models
use crate::error::ConfigError;
use crate::Prng;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stationary set of arms with hidden mean payouts.
///
/// The arm set is immutable once constructed: pulling arms never changes the
/// hidden means, so one instance can be shared by any number of trials.
pub trait Bandit {
    /// The number of selectable arms.
    fn num_arms(&self) -> usize;

    /// The index of the arm with the highest true mean (first index on ties).
    fn best_action(&self) -> usize;

    /// Sample the reward for pulling `action`.
    ///
    /// # Panics
    /// May panic if `action >= self.num_arms()`.
    fn sample_reward(&self, action: usize, rng: &mut Prng) -> f64;
}

/// A multi-armed bandit with Gaussian arm rewards of unit variance.
///
/// Each arm pays out its hidden true mean plus standard normal noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBandit {
    means: Array1<f64>,
}

impl GaussianBandit {
    /// Create a bandit from the hidden true mean of each arm.
    pub fn from_means<T: Into<Array1<f64>>>(means: T) -> Result<Self, ConfigError> {
        let means = means.into();
        if means.is_empty() {
            return Err(ConfigError::NoArms);
        }
        if let Some(&mean) = means.iter().find(|mean| !mean.is_finite()) {
            return Err(ConfigError::NonFiniteMean(mean));
        }
        Ok(Self { means })
    }

    /// The hidden true mean reward of each arm.
    pub const fn means(&self) -> &Array1<f64> {
        &self.means
    }
}

impl fmt::Display for GaussianBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GaussianBandit({})", self.means)
    }
}

impl Bandit for GaussianBandit {
    fn num_arms(&self) -> usize {
        self.means.len()
    }

    fn best_action(&self) -> usize {
        self.means.argmax().expect("bandit has at least one arm")
    }

    fn sample_reward(&self, action: usize, rng: &mut Prng) -> f64 {
        let noise: f64 = StandardNormal.sample(rng);
        self.means[action] + noise
    }
}

/// A multi-armed bandit that always pays each arm's exact mean.
///
/// Zero reward variance makes value estimates exact after one pull, which
/// pins down greedy behaviour in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeterministicBandit {
    values: Array1<f64>,
}

impl DeterministicBandit {
    /// Create a bandit from the exact payout of each arm.
    pub fn from_values<T: Into<Array1<f64>>>(values: T) -> Result<Self, ConfigError> {
        let values = values.into();
        if values.is_empty() {
            return Err(ConfigError::NoArms);
        }
        if let Some(&value) = values.iter().find(|value| !value.is_finite()) {
            return Err(ConfigError::NonFiniteMean(value));
        }
        Ok(Self { values })
    }
}

impl fmt::Display for DeterministicBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DeterministicBandit({})", self.values)
    }
}

impl Bandit for DeterministicBandit {
    fn num_arms(&self) -> usize {
        self.values.len()
    }

    fn best_action(&self) -> usize {
        self.values.argmax().expect("bandit has at least one arm")
    }

    fn sample_reward(&self, action: usize, _rng: &mut Prng) -> f64 {
        self.values[action]
    }
}

/// Distribution over Gaussian bandits with arm means drawn from a normal prior.
///
/// A sampled bandit keeps its means for life; resample to get a new task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPriorBandits {
    /// Number of arms of each sampled bandit.
    pub num_arms: usize,
    /// Mean of the normal prior over arm means.
    pub prior_mean: f64,
    /// Standard deviation of the normal prior over arm means.
    ///
    /// Zero collapses the prior so that every arm shares the same mean.
    pub prior_stddev: f64,
}

impl Default for NormalPriorBandits {
    fn default() -> Self {
        Self {
            num_arms: 10,
            prior_mean: 0.0,
            prior_stddev: 1.0,
        }
    }
}

impl NormalPriorBandits {
    /// Create a validated prior over bandits with `num_arms` arms.
    pub fn new(num_arms: usize, prior_mean: f64, prior_stddev: f64) -> Result<Self, ConfigError> {
        let prior = Self {
            num_arms,
            prior_mean,
            prior_stddev,
        };
        prior.validate()?;
        Ok(prior)
    }

    /// Check the prior parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_arms == 0 {
            return Err(ConfigError::NoArms);
        }
        if !self.prior_mean.is_finite() {
            return Err(ConfigError::NonFinitePriorMean(self.prior_mean));
        }
        if !self.prior_stddev.is_finite() || self.prior_stddev < 0.0 {
            return Err(ConfigError::PriorStddev(self.prior_stddev));
        }
        Ok(())
    }

    /// Sample a concrete bandit from the prior.
    pub fn sample_bandit(&self, rng: &mut Prng) -> Result<GaussianBandit, ConfigError> {
        self.validate()?;
        let prior = Normal::new(self.prior_mean, self.prior_stddev)
            .expect("validated prior parameters form a normal distribution");
        let means = Array1::from_shape_simple_fn(self.num_arms, || prior.sample(rng));
        Ok(GaussianBandit { means })
    }
}

#[cfg(test)]
mod gaussian_bandit {
    use super::*;
    use crate::utils::stats::OnlineMeanVariance;
    use rand::SeedableRng;

    #[test]
    fn no_arms_is_an_error() {
        assert_eq!(
            GaussianBandit::from_means(Vec::new()),
            Err(ConfigError::NoArms)
        );
    }

    #[test]
    fn non_finite_mean_is_an_error() {
        assert!(matches!(
            GaussianBandit::from_means(vec![0.0, f64::NAN]),
            Err(ConfigError::NonFiniteMean(_))
        ));
        assert_eq!(
            GaussianBandit::from_means(vec![0.0, f64::INFINITY]),
            Err(ConfigError::NonFiniteMean(f64::INFINITY))
        );
    }

    #[test]
    fn best_action_is_first_maximum() {
        let bandit = GaussianBandit::from_means(vec![1.0, 3.0, 3.0, -2.0]).unwrap();
        assert_eq!(bandit.best_action(), 1);
    }

    #[test]
    fn rewards_have_arm_mean_and_unit_variance() {
        let bandit = GaussianBandit::from_means(vec![-1.0, 2.5]).unwrap();
        let mut rng = Prng::seed_from_u64(110);
        let stats: OnlineMeanVariance<f64> = (0..10_000)
            .map(|_| bandit.sample_reward(1, &mut rng))
            .collect();
        // Standard error of the mean is 0.01; of the variance about 0.014.
        assert!((stats.mean().unwrap() - 2.5).abs() < 0.05);
        assert!((stats.variance().unwrap() - 1.0).abs() < 0.07);
    }

    #[test]
    fn pulls_do_not_change_means() {
        let bandit = GaussianBandit::from_means(vec![0.0, 1.0]).unwrap();
        let means_before = bandit.means().clone();
        let mut rng = Prng::seed_from_u64(110);
        for _ in 0..100 {
            let _ = bandit.sample_reward(0, &mut rng);
        }
        assert_eq!(bandit.means(), &means_before);
    }
}
