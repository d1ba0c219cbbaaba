use std::time::Duration;

use bytes::Bytes;

use crate::config::SerialConfig;
use crate::error::Result;

/// A line-oriented byte source: the capability the sample pipeline needs from
/// a serial device.
///
/// Implementations must keep every call bounded. `read_line` stops reading
/// once the source's read timeout has elapsed, whether or not bytes are still
/// arriving, and `wait_for_ready` waits at most the given duration.
/// Fatal device failures are reported as [`TransportError::Resource`] from
/// `read_line` or `write`; everything else is recoverable.
///
/// [`TransportError::Resource`]: crate::TransportError::Resource
pub trait ByteSource {
    /// Open the device with the given configuration.
    fn open(&mut self, config: &SerialConfig) -> Result<()>;

    /// Release the device. Buffered, incomplete lines are dropped.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Wait up to `timeout` for bytes to become readable.
    ///
    /// Returns `Ok(true)` when data is available.
    fn wait_for_ready(&mut self, timeout: Duration) -> Result<bool>;

    /// Return the next complete line including its trailing `\n`, or
    /// `Ok(None)` when no complete line arrived within the read timeout.
    fn read_line(&mut self) -> Result<Option<Bytes>>;

    /// Return up to `max` raw bytes, ignoring line boundaries.
    ///
    /// Empty when nothing arrived within the read timeout.
    fn read_available(&mut self, max: usize) -> Result<Bytes>;

    /// Write raw bytes to the device, returning how many were written.
    fn write(&mut self, data: &[u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn open(&mut self, config: &SerialConfig) -> Result<()> {
        (**self).open(config)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn wait_for_ready(&mut self, timeout: Duration) -> Result<bool> {
        (**self).wait_for_ready(timeout)
    }

    fn read_line(&mut self) -> Result<Option<Bytes>> {
        (**self).read_line()
    }

    fn read_available(&mut self, max: usize) -> Result<Bytes> {
        (**self).read_available(max)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }
}
