//! Async cadence driver for [`PollLoop`].

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uartscope_frame::Clock;
use uartscope_transport::ByteSource;

use crate::error::Result;
use crate::poll::PollLoop;
use crate::sink::{PersistenceSink, SampleSink};

/// Poll `pipeline` on a tokio interval until it closes or `cancel` fires.
///
/// Each firing runs one [`PollLoop::poll`]; reads are bounded by the source's
/// timeout, so polling inline does not stall the runtime for long.
/// Cancellation closes the loop before returning.
pub async fn run<S, P, L, C>(
    pipeline: &mut PollLoop<S, P, L, C>,
    cancel: CancellationToken,
) -> Result<()>
where
    S: ByteSource,
    P: SampleSink,
    L: PersistenceSink,
    C: Clock,
{
    let period = pipeline.config().cadence().max(Duration::from_millis(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while pipeline.is_open() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("poll driver cancelled");
                pipeline.close();
            }
            _ = interval.tick() => {
                pipeline.poll()?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use uartscope_frame::frame_bytes;
    use uartscope_transport::{ReplaySource, SerialConfig};

    use super::*;
    use crate::config::PipelineConfig;
    use crate::sink::PlotBuffer;

    fn capture(frames: u16) -> Vec<u8> {
        let mut bytes = Vec::new();
        for i in 0..frames {
            bytes.extend_from_slice(&frame_bytes(&[i; 6]).expect("values should encode"));
        }
        bytes
    }

    #[tokio::test]
    async fn cancellation_closes_the_loop() {
        let config = PipelineConfig {
            cadence_ms: 5,
            ..PipelineConfig::default()
        };
        let mut pipeline = PollLoop::new(
            ReplaySource::new(Cursor::new(capture(3))),
            PlotBuffer::default(),
            Vec::new(),
            config,
        );
        pipeline
            .open(&SerialConfig::default())
            .expect("open should succeed");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        run(&mut pipeline, cancel).await.expect("driver should stop cleanly");
        assert!(!pipeline.is_open());
        assert_eq!(pipeline.log().len(), 3);
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let mut pipeline = PollLoop::new(
            ReplaySource::new(Cursor::new(capture(2))),
            PlotBuffer::default(),
            Vec::new(),
            PipelineConfig::default(),
        );
        pipeline
            .open(&SerialConfig::default())
            .expect("open should succeed");

        let cancel = CancellationToken::new();
        cancel.cancel();
        run(&mut pipeline, cancel).await.expect("driver should stop cleanly");

        assert!(!pipeline.is_open());
        assert!(pipeline.log().is_empty());
    }

    #[tokio::test]
    async fn closed_loop_is_not_polled() {
        let mut pipeline = PollLoop::new(
            ReplaySource::new(Cursor::new(capture(1))),
            PlotBuffer::default(),
            Vec::new(),
            PipelineConfig::default(),
        );
        run(&mut pipeline, CancellationToken::new())
            .await
            .expect("driver should return");
        assert!(pipeline.log().is_empty());
    }
}
