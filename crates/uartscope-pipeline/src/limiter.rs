use uartscope_frame::Sample;

/// Default minimum spacing between forwarded samples, in seconds.
pub const DEFAULT_PLOT_INTERVAL: f64 = 0.002;

/// Outcome of offering a sample to the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Forward,
    Drop,
}

/// Throttles the plot feed by elapsed-time key.
///
/// A key is forwarded only when it is strictly more than `interval` past the
/// last forwarded key. The limiter only gates plotting; callers persist every
/// sample regardless.
#[derive(Debug, Clone)]
pub struct SampleRateLimiter {
    interval: f64,
    last_forwarded: f64,
}

impl SampleRateLimiter {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last_forwarded: 0.0,
        }
    }

    pub fn offer(&mut self, elapsed_key: f64) -> RateDecision {
        if elapsed_key - self.last_forwarded > self.interval {
            self.last_forwarded = elapsed_key;
            RateDecision::Forward
        } else {
            RateDecision::Drop
        }
    }

    pub fn offer_sample(&mut self, sample: &Sample) -> RateDecision {
        self.offer(sample.elapsed())
    }

    /// Key of the most recent forwarded sample (`0.0` before the first).
    pub fn last_forwarded(&self) -> f64 {
        self.last_forwarded
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }
}

impl Default for SampleRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_PLOT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_keys_forward_only_the_first() {
        let mut limiter = SampleRateLimiter::default();
        assert_eq!(limiter.offer(1.0), RateDecision::Forward);
        assert_eq!(limiter.offer(1.0015), RateDecision::Drop);
        assert_eq!(limiter.offer(1.0), RateDecision::Drop);
        assert_eq!(limiter.last_forwarded(), 1.0);
    }

    #[test]
    fn spaced_keys_forward_both() {
        let mut limiter = SampleRateLimiter::default();
        assert_eq!(limiter.offer(1.0), RateDecision::Forward);
        assert_eq!(limiter.offer(1.0031), RateDecision::Forward);
        assert_eq!(limiter.last_forwarded(), 1.0031);
    }

    #[test]
    fn key_exactly_one_interval_out_is_dropped() {
        let mut limiter = SampleRateLimiter::default();
        assert_eq!(limiter.offer(DEFAULT_PLOT_INTERVAL), RateDecision::Drop);
        assert_eq!(limiter.last_forwarded(), 0.0);
    }

    #[test]
    fn dropped_keys_do_not_move_the_reference() {
        let mut limiter = SampleRateLimiter::new(0.5);
        assert_eq!(limiter.offer(1.0), RateDecision::Forward);
        assert_eq!(limiter.offer(1.4), RateDecision::Drop);
        // 0.6 past the last forward, although only 0.2 past the last offer.
        assert_eq!(limiter.offer(1.6), RateDecision::Forward);
    }
}
