//! Run clock and progress against the time budget

use std::time::{Duration, Instant};

use serde::Serialize;

/// One-shot stopwatch started at monitor construction.
///
/// The first [`stop`](Self::stop) freezes the elapsed time; later stops
/// return the frozen value.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    stopped: Option<Duration>,
}

impl Stopwatch {
    /// Start a new stopwatch.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Elapsed time, frozen once stopped.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(|| self.started.elapsed())
    }

    /// Stop the clock and return the elapsed time.
    pub fn stop(&mut self) -> Duration {
        *self.stopped.get_or_insert_with(|| self.started.elapsed())
    }

    /// Whether the clock has been stopped.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped.is_some()
    }
}

/// Progress of the search run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Time since the monitor was created.
    pub elapsed: Duration,
    /// Budget left, when a budget is known.
    pub remaining: Option<Duration>,
    /// Percent of the budget used, clamped to 100.
    pub percent: Option<f64>,
}

impl Progress {
    /// Compute progress for `elapsed` against an optional budget.
    #[must_use]
    pub fn new(elapsed: Duration, budget: Option<Duration>) -> Self {
        let remaining = budget.map(|budget| budget.saturating_sub(elapsed));
        let percent = budget.filter(|b| !b.is_zero()).map(|budget| {
            (elapsed.as_secs_f64() / budget.as_secs_f64() * 100.0).min(100.0)
        });
        Self {
            elapsed,
            remaining,
            percent,
        }
    }
}
