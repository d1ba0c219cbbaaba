use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};
use uartscope_frame::{
    Clock, FrameDecoder, FrameError, FrameReader, FrameValidator, MonotonicClock, Sample,
};
use uartscope_transport::{ByteSource, SerialConfig, TransportError};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::fps::FpsCounter;
use crate::limiter::{RateDecision, SampleRateLimiter};
use crate::sink::{PersistenceSink, SampleSink};
use crate::status::{Status, StatusSink};

/// Longest single sleep in [`PollLoop::run_blocking`], so close requests are
/// noticed promptly even with a long cadence.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Thread-safe request to stop a running loop.
///
/// Clones share the flag. The loop checks it at the start of every tick and
/// again after each read.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle {
    requested: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn request_close(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Closed,
    Open,
}

/// Running totals since the loop was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub decoded: u64,
    pub invalid: u64,
    pub forwarded: u64,
    pub persisted: u64,
    pub persist_failures: u64,
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The loop is closed; nothing was read.
    Closed,
    /// No complete line was available.
    Idle,
    /// A line arrived but failed validation and was dropped.
    Invalid(FrameError),
    /// A line arrived after a close request and was dropped.
    Discarded,
    /// A sample was decoded and persisted. `forwarded` tells whether the
    /// plot sink also received it.
    Decoded { sample: Sample, forwarded: bool },
}

/// Totals for one [`PollLoop::poll`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub decoded: usize,
    pub invalid: usize,
    pub forwarded: usize,
    /// The loop was closed when the poll finished.
    pub closed: bool,
}

/// Drives a byte source through validation, decoding and rate limiting into
/// a plot sink and a persistence sink.
///
/// Every decoded sample is persisted; only samples the limiter forwards are
/// plotted. Sinks are serviced in that order within the same tick. Invalid
/// lines are dropped and the loop carries on; a fatal device error closes the
/// loop.
pub struct PollLoop<S, P, L, C = MonotonicClock> {
    reader: FrameReader<S>,
    validator: FrameValidator,
    decoder: FrameDecoder<C>,
    limiter: SampleRateLimiter,
    fps: FpsCounter,
    plot: P,
    log: L,
    status: Option<Box<dyn StatusSink + Send>>,
    config: PipelineConfig,
    state: LoopState,
    close: CloseHandle,
    stats: PipelineStats,
}

impl<S: ByteSource, P: SampleSink, L: PersistenceSink> PollLoop<S, P, L> {
    /// Loop stamping samples with a clock started now.
    pub fn new(source: S, plot: P, log: L, config: PipelineConfig) -> Self {
        Self::with_clock(source, plot, log, config, MonotonicClock::start())
    }
}

impl<S, P, L, C> PollLoop<S, P, L, C>
where
    S: ByteSource,
    P: SampleSink,
    L: PersistenceSink,
    C: Clock,
{
    pub fn with_clock(source: S, plot: P, log: L, config: PipelineConfig, clock: C) -> Self {
        Self {
            reader: FrameReader::new(source),
            validator: FrameValidator::new(config.validation),
            decoder: FrameDecoder::new(clock),
            limiter: SampleRateLimiter::new(config.plot_interval),
            fps: FpsCounter::new(config.fps_window),
            plot,
            log,
            status: None,
            config,
            state: LoopState::Closed,
            close: CloseHandle::default(),
            stats: PipelineStats::default(),
        }
    }

    /// Deliver status notices to `sink` as well as the log.
    pub fn with_status_sink(mut self, sink: impl StatusSink + Send + 'static) -> Self {
        self.status = Some(Box::new(sink));
        self
    }

    /// Open the device and start accepting frames.
    ///
    /// Waits at most the configured ready wait for the device to have data.
    /// On failure an `OpenError` status is published and the loop stays
    /// closed.
    pub fn open(&mut self, serial: &SerialConfig) -> Result<()> {
        if self.state == LoopState::Open {
            return Err(PipelineError::AlreadyOpen);
        }

        if let Err(err) = self.reader.get_mut().open(serial) {
            self.publish(Status::OpenError(err.to_string()));
            return Err(PipelineError::Open(err));
        }
        self.close.reset();
        self.state = LoopState::Open;

        match self.reader.get_mut().wait_for_ready(self.config.ready_wait()) {
            Ok(ready) => debug!(ready, "device readiness"),
            Err(err) if err.is_fatal() => return Err(self.fail(err)),
            Err(err) => debug!(error = %err, "readiness check failed"),
        }

        self.fps.reset(self.decoder.clock().elapsed());
        info!(port = %serial.port_name, "pipeline opened");
        self.publish(Status::Connected(serial.summary()));
        Ok(())
    }

    /// Release the device. No sample is produced after this returns.
    ///
    /// Closing a closed loop does nothing.
    pub fn close(&mut self) {
        if self.state == LoopState::Closed {
            return;
        }
        self.reader.get_mut().close();
        if let Err(err) = self.log.flush() {
            warn!(error = %err, "failed to flush sample log");
        }
        self.state = LoopState::Closed;
        info!(stats = ?self.stats, "pipeline closed");
        self.publish(Status::Disconnected);
    }

    /// Process at most one line.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.state == LoopState::Closed {
            return Ok(TickOutcome::Closed);
        }
        if self.close.is_requested() {
            self.close();
            return Ok(TickOutcome::Closed);
        }

        let raw = match self.reader.read_frame() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(TickOutcome::Idle),
            Err(FrameError::Transport(err)) if err.is_fatal() => return Err(self.fail(err)),
            Err(err) => {
                warn!(error = %err, "read failed");
                return Ok(TickOutcome::Idle);
            }
        };

        if self.close.is_requested() {
            debug!(len = raw.len(), "discarding frame read during close");
            self.close();
            return Ok(TickOutcome::Discarded);
        }

        let frame = match self.validator.validate(raw) {
            Ok(frame) => frame,
            Err(err) => {
                self.stats.invalid += 1;
                debug!(error = %err, "dropping invalid frame");
                return Ok(TickOutcome::Invalid(err));
            }
        };

        let sample = self.decoder.decode(frame);
        self.stats.decoded += 1;

        let forwarded = self.limiter.offer_sample(&sample) == RateDecision::Forward;
        if forwarded {
            self.plot.add_sample(&sample);
            self.stats.forwarded += 1;
        }

        if let Some(fps) = self.fps.record(sample.elapsed()) {
            let points = self.plot.point_count();
            self.publish(Status::Fps { fps, points });
        }

        match self.log.record(&sample) {
            Ok(()) => self.stats.persisted += 1,
            Err(err) => {
                self.stats.persist_failures += 1;
                warn!(error = %err, "failed to persist sample");
            }
        }

        Ok(TickOutcome::Decoded { sample, forwarded })
    }

    /// One cadence firing: up to `frames_per_tick` lines.
    ///
    /// Stops early once no line is available or the loop closes.
    pub fn poll(&mut self) -> Result<TickSummary> {
        let mut summary = TickSummary::default();
        for _ in 0..self.config.frames_per_tick.max(1) {
            match self.tick()? {
                TickOutcome::Decoded { forwarded, .. } => {
                    summary.decoded += 1;
                    summary.forwarded += usize::from(forwarded);
                }
                TickOutcome::Invalid(_) => summary.invalid += 1,
                TickOutcome::Idle | TickOutcome::Closed | TickOutcome::Discarded => break,
            }
        }
        summary.closed = !self.is_open();
        Ok(summary)
    }

    /// Poll at the configured cadence on the current thread until the loop
    /// closes.
    ///
    /// Returns `Ok` after a close request and `Err` on a fatal device error.
    pub fn run_blocking(&mut self) -> Result<()> {
        while self.is_open() {
            self.poll()?;

            let deadline = Instant::now() + self.config.cadence();
            while !self.close.is_requested() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                std::thread::sleep((deadline - now).min(SLEEP_SLICE));
            }
        }
        Ok(())
    }

    /// Write raw bytes to the open device.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        match self.reader.get_mut().write(data) {
            Ok(n) => Ok(n),
            Err(err) if err.is_fatal() => Err(self.fail(err)),
            Err(err) => Err(PipelineError::Transport(err)),
        }
    }

    fn fail(&mut self, err: TransportError) -> PipelineError {
        self.publish(Status::Critical(err.to_string()));
        self.close();
        PipelineError::Resource(err)
    }

    fn publish(&mut self, status: Status) {
        status.log();
        if let Some(sink) = self.status.as_mut() {
            sink.publish(&status);
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == LoopState::Open
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn plot(&self) -> &P {
        &self.plot
    }

    pub fn plot_mut(&mut self) -> &mut P {
        &mut self.plot
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn source(&self) -> &S {
        self.reader.get_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }

    /// Tear the loop down, returning the source and both sinks.
    pub fn into_parts(self) -> (S, P, L) {
        (self.reader.into_inner(), self.plot, self.log)
    }
}
