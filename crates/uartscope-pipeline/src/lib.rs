//! The sample pipeline: poll a byte source, validate and decode frames, then
//! fan samples out to a plot sink and a persistence sink.
//!
//! [`PollLoop`] owns every piece of state. It is single-threaded; the only
//! value shared across threads is its [`CloseHandle`].
//!
//! With the `async` feature, [`driver::run`] drives the loop from a tokio
//! interval instead of [`PollLoop::run_blocking`].

pub mod config;
#[cfg(feature = "async")]
pub mod driver;
pub mod error;
pub mod fps;
pub mod limiter;
pub mod persist;
pub mod poll;
pub mod sink;
pub mod status;

pub use config::{PipelineConfig, DEFAULT_CADENCE_MS, DEFAULT_READY_WAIT_MS};
pub use error::{PipelineError, Result};
pub use fps::{FpsCounter, DEFAULT_FPS_WINDOW};
pub use limiter::{RateDecision, SampleRateLimiter, DEFAULT_PLOT_INTERVAL};
pub use persist::{format_record, CsvLog, DEFAULT_LOG_PATH};
pub use poll::{CloseHandle, LoopState, PipelineStats, PollLoop, TickOutcome, TickSummary};
pub use sink::{
    NullSink, PersistenceSink, PlotBuffer, PlotSeries, SampleSink, DEFAULT_PLOT_CAPACITY,
};
pub use status::{Status, StatusSink};
