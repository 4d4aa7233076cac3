//! Batch simulation: many independent trials averaged into learning curves.
use super::trial::run_steps;
use super::{BatchConfig, LearningCurves, TrialRecord};
use crate::bandits::{Bandit, NormalPriorBandits};
use crate::error::ConfigError;
use crate::logging::{Event, Logger};
use crate::Prng;
use ndarray::{aview1, Array1};
use rand::SeedableRng;

/// Run a batch of independent trials on one bandit and average the results.
///
/// Every trial starts from fresh value estimates; the bandit's hidden means
/// stay fixed for the whole batch.
///
/// # Args
/// * `bandit` - The arm set shared by every trial.
/// * `config` - Batch parameters; validated before any sampling happens.
/// * `rng` - Random state consumed sequentially by the trials.
/// * `logger` - Receives per-step and per-trial events plus one `Batch` event.
pub fn run_batch<B>(
    bandit: &B,
    config: &BatchConfig,
    rng: &mut Prng,
    logger: &mut dyn Logger,
) -> Result<LearningCurves, ConfigError>
where
    B: Bandit + ?Sized,
{
    config.validate()?;
    let mut sums = CurveSums::new(config.trial.num_steps);
    for _ in 0..config.num_trials {
        let record = run_steps(bandit, &config.trial, rng, logger);
        sums.add(&record);
    }
    Ok(finish_batch(sums, config.num_trials, logger))
}

/// Run a batch of independent trials across several worker threads.
///
/// Trials are dealt out across `num_threads` workers, each with its own
/// random state forked from `rng`, so the result is reproducible for a fixed
/// seed and thread count (but differs from the serial runner's). The logger
/// is lent to the first worker thread; the remaining workers run unlogged.
pub fn run_batch_parallel<B>(
    bandit: &B,
    config: &BatchConfig,
    num_threads: usize,
    rng: &mut Prng,
    logger: &mut dyn Logger,
) -> Result<LearningCurves, ConfigError>
where
    B: Bandit + Sync + ?Sized,
{
    config.validate()?;
    if num_threads == 0 {
        return Err(ConfigError::NoThreads);
    }

    // Deal the trials out, remainder to the earliest workers.
    let base = config.num_trials / num_threads;
    let remainder = config.num_trials % num_threads;
    let workers: Vec<(Prng, usize)> = (0..num_threads)
        .map(|i| {
            let worker_rng = Prng::from_rng(&mut *rng).expect("Prng should be infallible");
            (worker_rng, base + usize::from(i < remainder))
        })
        .collect();

    // Send the logger to the first worker thread.
    let mut send_logger: Option<&mut dyn Logger> = Some(&mut *logger);

    let trial_config = &config.trial;
    let sums = crossbeam::scope(|scope| {
        let mut threads = Vec::new();
        for (mut worker_rng, num_worker_trials) in workers {
            let thread_logger = send_logger.take();
            threads.push(scope.spawn(move |_scope| {
                let mut null_logger = ();
                let worker_logger: &mut dyn Logger = thread_logger.unwrap_or(&mut null_logger);
                let mut worker_sums = CurveSums::new(trial_config.num_steps);
                for _ in 0..num_worker_trials {
                    let record = run_steps(bandit, trial_config, &mut worker_rng, worker_logger);
                    worker_sums.add(&record);
                }
                worker_sums
            }));
        }
        threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .fold(CurveSums::new(trial_config.num_steps), CurveSums::merge)
    })
    .unwrap();

    Ok(finish_batch(sums, config.num_trials, logger))
}

/// Run a batch with a fresh bandit drawn from the prior for every trial.
///
/// Averages over the task distribution instead of a single task, as when
/// comparing policies without committing to one set of arm means.
pub fn run_batch_resampling(
    prior: &NormalPriorBandits,
    config: &BatchConfig,
    rng: &mut Prng,
    logger: &mut dyn Logger,
) -> Result<LearningCurves, ConfigError> {
    config.validate()?;
    prior.validate()?;
    let mut sums = CurveSums::new(config.trial.num_steps);
    for _ in 0..config.num_trials {
        let bandit = prior.sample_bandit(rng)?;
        let record = run_steps(&bandit, &config.trial, rng, logger);
        sums.add(&record);
    }
    Ok(finish_batch(sums, config.num_trials, logger))
}

/// Convert summed records into curves and log the `Batch` event.
fn finish_batch(sums: CurveSums, num_trials: usize, logger: &mut dyn Logger) -> LearningCurves {
    let curves = sums.into_curves(num_trials);
    if let Some(final_mean_reward) = curves.final_mean_reward() {
        logger
            .log(Event::Batch, "mean_reward", final_mean_reward.into())
            .unwrap();
    }
    if let Some(final_optimal) = curves.final_optimal_action_rate() {
        logger
            .log(Event::Batch, "optimal_action_rate", final_optimal.into())
            .unwrap();
    }
    logger.done(Event::Batch);
    curves
}

/// Elementwise sums of trial records, one slot per step.
struct CurveSums {
    mean_rewards: Array1<f64>,
    optimal_counts: Array1<f64>,
}

impl CurveSums {
    fn new(num_steps: usize) -> Self {
        Self {
            mean_rewards: Array1::zeros(num_steps),
            optimal_counts: Array1::zeros(num_steps),
        }
    }

    fn add(&mut self, record: &TrialRecord) {
        self.mean_rewards += &aview1(&record.mean_rewards);
        for (count, &was_optimal) in self.optimal_counts.iter_mut().zip(&record.optimal_actions) {
            if was_optimal {
                *count += 1.0;
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.mean_rewards += &other.mean_rewards;
        self.optimal_counts += &other.optimal_counts;
        self
    }

    fn into_curves(self, num_trials: usize) -> LearningCurves {
        let scale = (num_trials as f64).recip();
        LearningCurves {
            mean_reward: self.mean_rewards * scale,
            optimal_action_rate: self.optimal_counts * scale,
        }
    }
}
