//! Command-line logger
use super::{Event, LogError, Loggable, Logger};
use crate::utils::stats::OnlineMeanVariance;
use enum_map::{enum_map, EnumMap};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Drop;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that periodically writes summaries to standard output.
///
/// Values are aggregated between displays: scalars by mean and standard
/// deviation, index samples into an empirical distribution.
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Display a summary of everything logged since the last display.
    pub fn display(&mut self) {
        println!();
        for (event, event_log) in self.events.iter_mut() {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }

            let per_event = event_log.summary_duration / u32::try_from(summary_size).unwrap();
            println!(
                "==== {:?} {} - {} ({:?} / event) ====",
                event,
                event_log.summary_start_index,
                event_log.index - 1,
                per_event,
            );

            for (name, aggregator) in &mut event_log.aggregators {
                println!("{:<24} {}", Paint::fixed(35, name), aggregator);
                aggregator.clear();
            }
            event_log.summary_start_index = event_log.index;
        }
        self.last_display_time = Instant::now();
    }
}

impl Logger for CLILogger {
    fn log(&mut self, event: Event, name: &'static str, value: Loggable) -> Result<(), LogError> {
        let aggregators = &mut self.events[event].aggregators;
        if let Some(aggregator) = aggregators.get_mut(name) {
            if let Err((value, expected)) = aggregator.update(value) {
                return Err(LogError::new(name, value, expected));
            }
        } else {
            let old_value = aggregators.insert(name, Aggregator::new(value));
            assert!(old_value.is_none());
        }
        Ok(())
    }

    fn done(&mut self, event: Event) {
        let event_log = &mut self.events[event];
        event_log.index += 1;

        for aggregator in event_log.aggregators.values_mut() {
            aggregator.commit()
        }

        let time_since_display = self.last_display_time.elapsed();
        event_log.summary_duration = time_since_display;
        if time_since_display < self.display_period {
            return;
        }

        self.display();
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Flush everything not yet displayed.
        self.display();
    }
}

struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    /// Duration of this summary period to the most recent update
    summary_duration: Duration,
    /// An aggregator for each log entry name.
    aggregators: BTreeMap<&'static str, Aggregator>,
}

impl EventLog {
    #[allow(clippy::missing_const_for_fn)] // Duration & BTreeMap const new not stabilized
    pub fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            summary_duration: Duration::new(0, 0),
            aggregators: BTreeMap::new(),
        }
    }
}

/// Between-display aggregation of the values logged under one name.
///
/// A value logged during an event is pending until `done` marks the event
/// complete; re-logging the same name before then replaces the pending value
/// so that each event contributes at most once to the aggregate.
#[derive(Debug)]
enum Aggregator {
    /// Aggregates nothing
    Nothing,
    Scalar {
        stats: OnlineMeanVariance<f64>,
        pending: Option<f64>,
    },
    IndexDistribution {
        counts: Vec<u64>,
        pending: Option<usize>,
    },
}

impl Aggregator {
    /// Create a new aggregator from the first logged value.
    fn new(value: Loggable) -> Self {
        match value {
            Loggable::Nothing => Self::Nothing,
            Loggable::Scalar(x) => Self::Scalar {
                stats: OnlineMeanVariance::new(),
                pending: Some(x),
            },
            Loggable::IndexSample { value, size } => Self::IndexDistribution {
                counts: vec![0; size],
                pending: Some(value),
            },
        }
    }

    /// Set the pending value from a logged value.
    ///
    /// Returns `Err((value, expected))` if the value is incompatible with
    /// this aggregator.
    fn update(&mut self, value: Loggable) -> Result<(), (Loggable, String)> {
        match self {
            Self::Nothing => match value {
                Loggable::Nothing => {}
                _ => return Err((value, "Nothing".into())),
            },
            Self::Scalar { pending, .. } => match value {
                Loggable::Scalar(x) => *pending = Some(x),
                _ => return Err((value, "Scalar".into())),
            },
            Self::IndexDistribution { counts, pending } => match value {
                Loggable::IndexSample { value, size } if counts.len() == size => {
                    *pending = Some(value)
                }
                v => return Err((v, format!("IndexSample{{size: {}}}", counts.len()))),
            },
        }
        Ok(())
    }

    /// Commit the pending value into the aggregate.
    fn commit(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Scalar { stats, pending } => {
                if let Some(value) = pending.take() {
                    stats.push(value)
                }
            }
            Self::IndexDistribution { counts, pending } => {
                if let Some(value) = pending.take() {
                    counts[value] += 1
                }
            }
        }
    }

    /// Clear the aggregated values (but not the pending value).
    fn clear(&mut self) {
        match self {
            Self::Nothing => {}
            Self::Scalar { stats, .. } => *stats = OnlineMeanVariance::new(),
            Self::IndexDistribution { counts, .. } => counts.fill(0),
        }
    }
}

/// Display the committed aggregate.
impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing"),
            Self::Scalar { stats, .. } => {
                match stats.mean() {
                    Some(mean) => write!(f, "{:.3}", mean)?,
                    None => write!(f, "None")?,
                }
                if stats.count() > 1 {
                    let stddev = stats.stddev().unwrap();
                    write!(f, " {}", Paint::fixed(8, format!("(σ {:.3})", stddev)))?;
                }
                Ok(())
            }
            Self::IndexDistribution { counts, .. } => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "(n {})  [", total)?;
                let mut first = true;
                for count in counts {
                    if first {
                        first = false;
                    } else {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", count * 100 / total)?;
                }
                write!(f, "]%")
            }
        }
    }
}
