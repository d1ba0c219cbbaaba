/// Default averaging window for the frame-rate readout, in seconds.
pub const DEFAULT_FPS_WINDOW: f64 = 2.0;

/// Counts decoded frames and reports the average rate once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f64,
    window_start: f64,
    frames: u64,
}

impl FpsCounter {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            window_start: 0.0,
            frames: 0,
        }
    }

    /// Count one frame at `key`. When the window has elapsed, returns the
    /// average rate over it and starts a new window at `key`.
    pub fn record(&mut self, key: f64) -> Option<f64> {
        self.frames += 1;
        let span = key - self.window_start;
        if span > self.window {
            let fps = self.frames as f64 / span;
            self.window_start = key;
            self.frames = 0;
            Some(fps)
        } else {
            None
        }
    }

    /// Start a fresh window at `key`.
    pub fn reset(&mut self, key: f64) {
        self.window_start = key;
        self.frames = 0;
    }

    /// Frames counted in the current window.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(DEFAULT_FPS_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window_and_resets() {
        let mut fps = FpsCounter::default();
        for i in 1..=8 {
            assert_eq!(fps.record(f64::from(i) * 0.25), None);
        }
        // Ninth frame at 2.25 s closes the first window.
        assert_eq!(fps.record(2.25), Some(9.0 / 2.25));
        assert_eq!(fps.frames(), 0);

        assert_eq!(fps.record(3.0), None);
        assert_eq!(fps.frames(), 1);
    }

    #[test]
    fn reset_moves_window_start() {
        let mut fps = FpsCounter::new(1.0);
        fps.record(0.5);
        fps.reset(10.0);
        assert_eq!(fps.frames(), 0);
        assert_eq!(fps.record(10.5), None);
        assert_eq!(fps.record(11.5), Some(2.0 / 1.5));
    }
}
