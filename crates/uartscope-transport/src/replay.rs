use std::io::Read;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};
use crate::line::LineReader;
use crate::traits::ByteSource;

/// A [`ByteSource`] that replays previously captured bytes.
///
/// The capture is consumed once; closing drops it and a second `open` fails.
/// Writes are accepted and discarded, which lets command paths that talk to
/// the device run unchanged against a recording.
pub struct ReplaySource<R> {
    pending: Option<R>,
    reader: Option<LineReader<R>>,
    label: String,
}

impl<R: Read> ReplaySource<R> {
    pub fn new(capture: R) -> Self {
        Self::with_label(capture, "replay")
    }

    /// Source whose status reports name the capture as `label`.
    pub fn with_label(capture: R, label: impl Into<String>) -> Self {
        Self {
            pending: Some(capture),
            reader: None,
            label: label.into(),
        }
    }

    /// Whether every line of the capture has been returned.
    pub fn is_exhausted(&self) -> bool {
        match &self.reader {
            Some(reader) => reader.is_eof() && reader.buffered() == 0,
            None => self.pending.is_none(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<R: Read> ByteSource for ReplaySource<R> {
    fn open(&mut self, config: &SerialConfig) -> Result<()> {
        if self.reader.is_some() {
            return Err(TransportError::AlreadyOpen);
        }
        let capture = self.pending.take().ok_or_else(|| TransportError::Open {
            port: self.label.clone(),
            reason: "capture already consumed".to_string(),
        })?;
        info!(capture = %self.label, requested = %config.port_name, "replay opened");
        self.reader = Some(LineReader::new(capture));
        Ok(())
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            info!(capture = %self.label, "replay closed");
        }
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn wait_for_ready(&mut self, _timeout: Duration) -> Result<bool> {
        let reader = self.reader.as_ref().ok_or(TransportError::NotOpen)?;
        Ok(!reader.is_eof() || reader.buffered() > 0)
    }

    fn read_line(&mut self) -> Result<Option<Bytes>> {
        let reader = self.reader.as_mut().ok_or(TransportError::NotOpen)?;
        Ok(reader.read_line()?)
    }

    fn read_available(&mut self, max: usize) -> Result<Bytes> {
        let reader = self.reader.as_mut().ok_or(TransportError::NotOpen)?;
        Ok(reader.read_available(max)?)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.reader.is_none() {
            return Err(TransportError::NotOpen);
        }
        debug!(len = data.len(), "replay discarding write");
        Ok(data.len())
    }
}
