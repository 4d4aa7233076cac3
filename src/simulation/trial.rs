//! Single-trial simulation.
use super::{TrialConfig, TrialRecord};
use crate::bandits::Bandit;
use crate::error::ConfigError;
use crate::estimates::ActionEstimates;
use crate::logging::{Event, Loggable, Logger};
use crate::Prng;

/// Run one trial: a fixed number of select-pull-update steps.
///
/// Value estimates start fresh so nothing learned in one trial can leak into
/// another; the bandit itself is never mutated and may be shared by any
/// number of trials.
///
/// # Args
/// * `bandit` - The arm set to pull from.
/// * `config` - Trial parameters; validated before any sampling happens.
/// * `rng` - Random state for action selection and reward noise.
/// * `logger` - Receives a `Step` event per step and one `Trial` event.
pub fn run_trial<B>(
    bandit: &B,
    config: &TrialConfig,
    rng: &mut Prng,
    logger: &mut dyn Logger,
) -> Result<TrialRecord, ConfigError>
where
    B: Bandit + ?Sized,
{
    config.validate()?;
    Ok(run_steps(bandit, config, rng, logger))
}

/// Trial loop without the configuration check.
///
/// Batch runners validate once up front instead of once per trial.
pub(super) fn run_steps<B>(
    bandit: &B,
    config: &TrialConfig,
    rng: &mut Prng,
    logger: &mut dyn Logger,
) -> TrialRecord
where
    B: Bandit + ?Sized,
{
    let num_arms = bandit.num_arms();
    let best_action = bandit.best_action();
    let mut estimates = ActionEstimates::new(num_arms, config.initial_value);
    let mut record = TrialRecord::with_capacity(config.num_steps);
    let mut mean_reward = 0.0;

    for step_index in 1..=config.num_steps {
        let action = config
            .policy
            .select_action(&estimates, step_index as u64, rng);
        let reward = bandit.sample_reward(action, rng);
        estimates.update(action, reward, config.step_size);

        let was_optimal = action == best_action;
        mean_reward += (reward - mean_reward) / step_index as f64;
        record.mean_rewards.push(mean_reward);
        record.optimal_actions.push(was_optimal);

        logger.log(Event::Step, "reward", reward.into()).unwrap();
        logger
            .log(
                Event::Step,
                "action",
                Loggable::IndexSample {
                    value: action,
                    size: num_arms,
                },
            )
            .unwrap();
        let optimal_indicator = if was_optimal { 1.0 } else { 0.0 };
        logger
            .log(Event::Step, "optimal", optimal_indicator.into())
            .unwrap();
        logger.done(Event::Step);

        // Exactly one estimate update per step.
        debug_assert_eq!(estimates.num_updates(), step_index as u64);
    }

    let optimal_count = record.optimal_actions.iter().filter(|&&o| o).count();
    logger
        .log(Event::Trial, "mean_reward", mean_reward.into())
        .unwrap();
    logger
        .log(
            Event::Trial,
            "optimal_rate",
            (optimal_count as f64 / config.num_steps as f64).into(),
        )
        .unwrap();
    logger.done(Event::Trial);
    record
}
