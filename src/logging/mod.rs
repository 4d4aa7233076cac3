//! Logging statistics from simulation runs
pub mod cli;

pub use cli::CLILogger;

use enum_map::Enum;
use std::error::Error;
use std::fmt;

/// Simulation run events, from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Event {
    /// One action-reward interaction within a trial.
    Step,
    /// One complete trial: a fixed number of steps on a fresh estimator.
    Trial,
    /// One batch of trials aggregated into learning curves.
    Batch,
}

/// A value that can be logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Loggable {
    /// Nothing. No data to log.
    /// Logging Nothing may still produce a placeholder entry for the name.
    Nothing,
    /// A scalar value. Aggregated by mean and standard deviation.
    Scalar(f64),
    /// A sample from a distribution over `0 .. (size-1)`.
    /// Aggregated into an empirical distribution.
    IndexSample { value: usize, size: usize },
}

impl From<f64> for Loggable {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

/// Log statistics from a simulation run.
///
/// Loggers are `Send` so that a parallel runner can lend its logger to one of
/// the worker threads.
pub trait Logger: Send {
    /// Log a value.
    ///
    /// # Args
    /// * `event` - The event associated with this value.
    /// * `name` - The name that identifies this value.
    /// * `value` - The value to log.
    ///
    /// # Returns
    /// May return an error if the logged value is structurally incompatible
    /// with previous values logged under the same name.
    fn log(&mut self, event: Event, name: &'static str, value: Loggable) -> Result<(), LogError>;

    /// Mark the end of an event instance.
    ///
    /// All values logged for the event since the last call are committed as
    /// a single occurrence; logging the same name twice within one instance
    /// overwrites the first value.
    fn done(&mut self, event: Event);
}

/// Logger that does nothing
impl Logger for () {
    fn log(&mut self, _: Event, _: &'static str, _: Loggable) -> Result<(), LogError> {
        Ok(())
    }

    fn done(&mut self, _: Event) {}
}

/// Error logging a value.
#[derive(Debug, Clone)]
pub struct LogError {
    name: &'static str,
    value: Loggable,
    expected: String,
}

impl LogError {
    pub fn new(name: &'static str, value: Loggable, expected: String) -> Self {
        Self {
            name,
            value,
            expected,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\"{}\": incompatible value {:?}, expected {}",
            self.name, self.value, self.expected
        )
    }
}

impl Error for LogError {}
