//! Action-selection policies
use crate::estimates::ActionEstimates;
use crate::error::ConfigError;
use crate::Prng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Added to update counts in the confidence bonus denominator so that an
/// untried action gets a huge but finite bonus instead of dividing by zero.
const VISIT_EPSILON: f64 = 1e-6;

/// How to choose an action from the current value estimates.
///
/// Exploration is decided first: with probability `epsilon` the action is
/// uniformly random. Otherwise the action maximizes either the plain value
/// estimates or, when `ucb_scale > 0`, the estimates plus an upper confidence
/// bound bonus that favours rarely tried actions. Ties are broken uniformly
/// at random among all maximizers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Probability of taking a uniformly random action.
    pub epsilon: f64,
    /// Scale factor on the confidence bonus; controls the exploration rate.
    ///
    /// Zero disables the bonus entirely.
    pub ucb_scale: f64,
}

impl SelectionPolicy {
    /// Always exploit the current value estimates.
    pub const fn greedy() -> Self {
        Self {
            epsilon: 0.0,
            ucb_scale: 0.0,
        }
    }

    /// Explore with probability `epsilon`, otherwise exploit.
    pub const fn epsilon_greedy(epsilon: f64) -> Self {
        Self {
            epsilon,
            ucb_scale: 0.0,
        }
    }

    /// Exploit the value estimates plus an upper confidence bound bonus.
    pub const fn ucb(ucb_scale: f64) -> Self {
        Self {
            epsilon: 0.0,
            ucb_scale,
        }
    }

    /// Check the policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        if !self.ucb_scale.is_finite() || self.ucb_scale < 0.0 {
            return Err(ConfigError::UcbScale(self.ucb_scale));
        }
        Ok(())
    }

    /// Choose an action given the current value estimates.
    ///
    /// `step_index` is the 1-based index of the step about to be taken; the
    /// confidence bonus grows with its logarithm.
    ///
    /// One exploration draw is consumed on every call, whatever the value of
    /// `epsilon`, so changing `epsilon` alone never shifts the rest of a
    /// seeded random sequence.
    ///
    /// # Panics
    /// If `step_index` is zero or there are no actions to choose from.
    pub fn select_action(
        &self,
        estimates: &ActionEstimates,
        step_index: u64,
        rng: &mut Prng,
    ) -> usize {
        assert!(step_index >= 1, "step_index is 1-based");
        if rng.gen::<f64>() < self.epsilon {
            return rng.gen_range(0..estimates.num_actions());
        }

        if self.ucb_scale > 0.0 {
            let log_step = (step_index as f64).ln();
            let scores = estimates
                .values()
                .iter()
                .zip(estimates.counts())
                .map(|(&value, &count)| {
                    value + self.ucb_scale * (log_step / (count as f64 + VISIT_EPSILON)).sqrt()
                });
            random_argmax(scores, rng)
        } else {
            random_argmax(estimates.values().iter().copied(), rng)
        }
    }
}

/// Defaults to epsilon-greedy with a 10% exploration rate.
impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::epsilon_greedy(0.1)
    }
}

/// The index of a maximal value, chosen uniformly at random among maximizers.
///
/// Non-comparable values (NaN) are never selected.
///
/// # Panics
/// If the iterator is empty or yields only NaN.
fn random_argmax<I: Iterator<Item = f64>>(scores: I, rng: &mut Prng) -> usize {
    let mut best = f64::NEG_INFINITY;
    let mut maximizers: SmallVec<[usize; 8]> = SmallVec::new();
    for (index, score) in scores.enumerate() {
        if score > best {
            best = score;
            maximizers.clear();
            maximizers.push(index);
        } else if score == best {
            maximizers.push(index);
        }
    }
    assert!(!maximizers.is_empty(), "no comparable scores");
    maximizers[rng.gen_range(0..maximizers.len())]
}

#[cfg(test)]
mod selection_policy {
    use super::*;
    use crate::estimates::StepSize;
    use rand::SeedableRng;
    use rstest::rstest;
    use std::ops::RangeInclusive;

    /// Number of draws when running a statistical test
    const NUM_ITERS_STATS: u64 = 1000;

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)] // negative f64 casts to 0.0 as desired
    fn bernoulli_confidence_interval(p: f64, n: u64) -> RangeInclusive<u64> {
        // Using Wald method <https://en.wikipedia.org/wiki/Binomial_distribution#Wald_method>
        // Quantile for error rate of 1e-5
        let z = 4.4;
        let nf = n as f64;
        let stddev = (p * (1.0 - p) * nf).sqrt();
        let lower_bound = nf * p - z * stddev;
        let upper_bound = nf * p + z * stddev;
        (lower_bound.round() as u64)..=(upper_bound.round() as u64)
    }

    /// Estimates with the given exact values, each from a single update.
    fn estimates_with_values(values: &[f64]) -> ActionEstimates {
        let mut estimates = ActionEstimates::new(values.len(), 0.0);
        for (action, &value) in values.iter().enumerate() {
            estimates.update(action, value, StepSize::Constant(1.0));
        }
        estimates
    }

    fn selection_counts(
        policy: &SelectionPolicy,
        estimates: &ActionEstimates,
        num_draws: u64,
        rng: &mut Prng,
    ) -> Vec<u64> {
        let mut counts = vec![0; estimates.num_actions()];
        for _ in 0..num_draws {
            counts[policy.select_action(estimates, 1, rng)] += 1;
        }
        counts
    }

    #[test]
    fn greedy_selects_the_unique_maximizer() {
        let estimates = estimates_with_values(&[0.5, 2.0, -1.0, 1.9]);
        let mut rng = Prng::seed_from_u64(53);
        for _ in 0..100 {
            assert_eq!(
                SelectionPolicy::greedy().select_action(&estimates, 1, &mut rng),
                1
            );
        }
    }

    #[test]
    fn greedy_breaks_ties_uniformly() {
        let estimates = ActionEstimates::new(4, 0.0);
        let mut rng = Prng::seed_from_u64(53);
        let counts = selection_counts(
            &SelectionPolicy::greedy(),
            &estimates,
            NUM_ITERS_STATS,
            &mut rng,
        );
        let ci = bernoulli_confidence_interval(0.25, NUM_ITERS_STATS);
        assert!(counts.iter().all(|count| ci.contains(count)));
    }

    #[test]
    fn epsilon_one_selects_uniformly() {
        // Even with a strict maximizer every arm is equally likely.
        let estimates = estimates_with_values(&[10.0, 0.0, 0.0, 0.0, 0.0]);
        let mut rng = Prng::seed_from_u64(53);
        let counts = selection_counts(
            &SelectionPolicy::epsilon_greedy(1.0),
            &estimates,
            NUM_ITERS_STATS,
            &mut rng,
        );
        let ci = bernoulli_confidence_interval(0.2, NUM_ITERS_STATS);
        assert!(counts.iter().all(|count| ci.contains(count)));
    }

    #[test]
    fn epsilon_explores_at_the_configured_rate() {
        // The non-best arm is only reachable through exploration: p = eps / 2.
        let estimates = estimates_with_values(&[1.0, 0.0]);
        let mut rng = Prng::seed_from_u64(53);
        let counts = selection_counts(
            &SelectionPolicy::epsilon_greedy(0.3),
            &estimates,
            NUM_ITERS_STATS,
            &mut rng,
        );
        let ci = bernoulli_confidence_interval(0.15, NUM_ITERS_STATS);
        assert!(ci.contains(&counts[1]));
    }

    #[test]
    fn ucb_prefers_an_untried_arm() {
        // Arm 0 is well explored with high value; arm 1 has never been tried
        // so its confidence bonus dwarfs any value difference.
        let mut estimates = ActionEstimates::new(2, 0.0);
        for _ in 0..5 {
            estimates.update(0, 10.0, StepSize::SampleAverage);
        }
        let mut rng = Prng::seed_from_u64(53);
        for _ in 0..100 {
            assert_eq!(
                SelectionPolicy::ucb(0.5).select_action(&estimates, 6, &mut rng),
                1
            );
        }
    }

    #[test]
    fn ucb_with_zero_scale_is_greedy() {
        let estimates = estimates_with_values(&[0.0, 1.0, 0.5]);
        let mut rng = Prng::seed_from_u64(53);
        for _ in 0..100 {
            assert_eq!(
                SelectionPolicy::ucb(0.0).select_action(&estimates, 1, &mut rng),
                1
            );
        }
    }

    #[rstest]
    #[case(SelectionPolicy::greedy())]
    #[case(SelectionPolicy::epsilon_greedy(0.0))]
    #[case(SelectionPolicy::epsilon_greedy(1.0))]
    #[case(SelectionPolicy::ucb(2.0))]
    #[case(SelectionPolicy::default())]
    fn valid(#[case] policy: SelectionPolicy) {
        assert_eq!(policy.validate(), Ok(()));
    }

    #[rstest]
    #[case(SelectionPolicy::epsilon_greedy(-0.1))]
    #[case(SelectionPolicy::epsilon_greedy(1.1))]
    #[case(SelectionPolicy::epsilon_greedy(f64::NAN))]
    fn invalid_epsilon(#[case] policy: SelectionPolicy) {
        assert!(matches!(policy.validate(), Err(ConfigError::Epsilon(_))));
    }

    #[rstest]
    #[case(SelectionPolicy::ucb(-0.5))]
    #[case(SelectionPolicy::ucb(f64::INFINITY))]
    #[case(SelectionPolicy::ucb(f64::NAN))]
    fn invalid_ucb_scale(#[case] policy: SelectionPolicy) {
        assert!(matches!(policy.validate(), Err(ConfigError::UcbScale(_))));
    }

    #[test]
    #[should_panic]
    fn step_index_zero_panics() {
        let estimates = ActionEstimates::new(2, 0.0);
        let mut rng = Prng::seed_from_u64(53);
        let _ = SelectionPolicy::greedy().select_action(&estimates, 0, &mut rng);
    }
}

#[cfg(test)]
mod random_argmax {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn unique_maximum() {
        let mut rng = Prng::seed_from_u64(53);
        let index = random_argmax([1.0, 3.0, 2.0].into_iter(), &mut rng);
        assert_eq!(index, 1);
    }

    #[test]
    fn skips_nan() {
        let mut rng = Prng::seed_from_u64(53);
        let index = random_argmax([1.0, f64::NAN, 0.5].into_iter(), &mut rng);
        assert_eq!(index, 0);
    }

    #[test]
    fn every_tie_is_reachable() {
        let mut rng = Prng::seed_from_u64(53);
        let mut seen = [false; 4];
        for _ in 0..100 {
            seen[random_argmax([2.0, 1.0, 2.0, 2.0].into_iter(), &mut rng)] = true;
        }
        assert_eq!(seen, [true, false, true, true]);
    }
}
