use chrono::{DateTime, Local};

use crate::channel::{Channel, CHANNEL_COUNT};

/// Wall-clock format used when a sample is written out (`HH:MM:SS.mmm`).
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// One decoded telemetry reading across all six channels.
///
/// Samples are immutable and cheap to clone. They can only be produced by
/// decoding a [`ValidatedFrame`](crate::ValidatedFrame).
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    channels: [i32; CHANNEL_COUNT],
    captured_at: DateTime<Local>,
    elapsed: f64,
}

impl Sample {
    pub(crate) fn new(
        channels: [i32; CHANNEL_COUNT],
        captured_at: DateTime<Local>,
        elapsed: f64,
    ) -> Self {
        Self {
            channels,
            captured_at,
            elapsed,
        }
    }

    /// Channel readings in frame order (A..F).
    pub fn channels(&self) -> [i32; CHANNEL_COUNT] {
        self.channels
    }

    pub fn value(&self, channel: Channel) -> i32 {
        self.channels[channel.index()]
    }

    /// Wall-clock capture time.
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Seconds since pipeline start.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Capture time rendered as `HH:MM:SS.mmm`.
    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Whether every reading lies in the nominal `0..=999` range.
    pub fn in_range(&self) -> bool {
        self.channels.iter().all(|v| (0..=999).contains(v))
    }
}
