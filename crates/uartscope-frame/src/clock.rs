use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};

/// Time source for sample stamping.
///
/// `elapsed` is the monotonic key used for plotting and rate limiting;
/// `now` is the wall-clock capture time written to logs.
pub trait Clock {
    /// Seconds since the pipeline started.
    fn elapsed(&self) -> f64;

    fn now(&self) -> DateTime<Local>;
}

/// Production clock: monotonic elapsed time from a fixed start instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Clock whose elapsed key counts from now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock whose elapsed key only moves when told to.
///
/// Clones share the same key, so a test (or an offline replay) can hold one
/// handle and advance the time seen by a pipeline holding another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed_bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, elapsed: f64) {
        self.elapsed_bits.store(elapsed.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.elapsed() + seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f64 {
        f64::from_bits(self.elapsed_bits.load(Ordering::SeqCst))
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        assert_eq!(clock.elapsed(), 0.0);

        handle.advance(1.5);
        handle.advance(0.25);
        assert_eq!(clock.elapsed(), 1.75);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::start();
        let first = clock.elapsed();
        let second = clock.elapsed();
        assert!(second >= first);
    }
}
