//! General time utility functions and fixed-rate timers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fixed-period timer for use in a cooperative main loop.
///
/// Several timers can share one thread: the loop polls each of them and then
/// sleeps until the earliest deadline (see [`sleep_until_next`]). Timers never
/// fire more than once per poll. If a deadline is missed by more than a whole
/// period the missed ticks are dropped rather than fired in a burst, and the
/// overrun counter is incremented.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    next_due: Instant,
    num_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PeriodicTimer {
    /// Create a new timer with the given period which is first due at `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_due: start,
            num_overruns: 0,
        }
    }

    /// Create a new timer running at the given frequency.
    ///
    /// `freq_hz` must be positive and finite.
    pub fn from_frequency(freq_hz: f64, start: Instant) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / freq_hz), start)
    }

    /// The period of the timer.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The next instant at which the timer is due.
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Number of times a whole period or more has been missed.
    pub fn num_overruns(&self) -> u64 {
        self.num_overruns
    }

    /// Returns `true` if the timer is due at `now`, advancing the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }

        self.next_due += self.period;

        if self.next_due <= now {
            self.num_overruns += 1;
            self.next_due = now + self.period;
        }

        true
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Block the current thread until the earliest deadline of the given timers.
///
/// Returns immediately if any timer is already due.
pub fn sleep_until_next(timers: &[&PeriodicTimer]) {
    let next = match timers.iter().map(|t| t.next_due()).min() {
        Some(n) => n,
        None => return,
    };

    if let Some(d) = next.checked_duration_since(Instant::now()) {
        std::thread::sleep(d);
    }
}
