//! Compare epsilon-greedy exploration rates on a ten-armed Gaussian testbed.
//!
//! Averages 2000 trials of 1000 steps for each exploration rate, all on the
//! same sampled task, and prints the resulting learning-curve endpoints.
//! Pass `--json` to emit one machine-readable line per exploration rate
//! instead of the progress log.
use karmed::logging::{CLILogger, Logger};
use karmed::{
    run_batch_parallel, BatchConfig, LearningCurves, NormalPriorBandits, Prng, SelectionPolicy,
    StepSize, TrialConfig,
};
use rand::SeedableRng;
use serde::Serialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SweepPoint {
    epsilon: f64,
    curves: LearningCurves,
}

fn main() {
    let json_output = env::args().nth(1).as_deref() == Some("--json");

    let mut rng = Prng::seed_from_u64(0);
    let bandit = NormalPriorBandits::default()
        .sample_bandit(&mut rng)
        .unwrap();
    if !json_output {
        println!("{}", bandit);
    }

    let num_threads = num_cpus::get();
    for epsilon in [0.1, 0.01, 0.0] {
        let config = BatchConfig {
            num_trials: 2000,
            trial: TrialConfig {
                num_steps: 1000,
                initial_value: 0.0,
                policy: SelectionPolicy::epsilon_greedy(epsilon),
                step_size: StepSize::SampleAverage,
            },
        };

        let curves = {
            // This block ensures the logger is dropped before the summary is
            // printed so that the flushed outputs appear in-order.
            let mut logger: Box<dyn Logger> = if json_output {
                Box::new(())
            } else {
                Box::new(CLILogger::new(Duration::from_secs(1)))
            };
            run_batch_parallel(
                &bandit,
                &config,
                num_threads,
                &mut Prng::from_rng(&mut rng).unwrap(),
                &mut *logger,
            )
            .unwrap()
        };

        if json_output {
            let point = SweepPoint { epsilon, curves };
            println!("{}", serde_json::to_string(&point).unwrap());
        } else {
            println!("\nepsilon = {}: {}", epsilon, curves);
        }
    }
}
