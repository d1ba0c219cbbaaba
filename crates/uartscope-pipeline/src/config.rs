use std::time::Duration;

use serde::{Deserialize, Serialize};
use uartscope_frame::ValidationMode;

use crate::fps::DEFAULT_FPS_WINDOW;
use crate::limiter::DEFAULT_PLOT_INTERVAL;
use crate::sink::DEFAULT_PLOT_CAPACITY;

/// Default interval between poll ticks.
pub const DEFAULT_CADENCE_MS: u64 = 900;

/// Default bound on the readiness wait after open.
pub const DEFAULT_READY_WAIT_MS: u64 = 10;

/// Tuning for the poll loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Milliseconds between poll ticks.
    pub cadence_ms: u64,
    /// Upper bound in milliseconds on waiting for the device after open.
    pub ready_wait_ms: u64,
    /// Minimum elapsed seconds between samples forwarded to the plot sink.
    pub plot_interval: f64,
    /// Seconds over which the frame rate is averaged.
    pub fps_window: f64,
    /// Lines processed per tick at most. The default of one reads a single
    /// line per timer firing.
    pub frames_per_tick: usize,
    /// Frame validation rules.
    pub validation: ValidationMode,
    /// Points kept per channel by the in-memory plot buffer.
    pub plot_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cadence_ms: DEFAULT_CADENCE_MS,
            ready_wait_ms: DEFAULT_READY_WAIT_MS,
            plot_interval: DEFAULT_PLOT_INTERVAL,
            fps_window: DEFAULT_FPS_WINDOW,
            frames_per_tick: 1,
            validation: ValidationMode::default(),
            plot_capacity: DEFAULT_PLOT_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    pub fn ready_wait(&self) -> Duration {
        Duration::from_millis(self.ready_wait_ms)
    }
}
