use tracing::trace;
use uartscope_transport::ByteSource;

use crate::codec::RawFrame;
use crate::error::Result;

/// Reads raw frames from any [`ByteSource`].
///
/// Each line the source yields becomes one [`RawFrame`]; nothing is checked
/// here. Source errors are passed through as [`FrameError::Transport`].
///
/// [`FrameError::Transport`]: crate::FrameError::Transport
pub struct FrameReader<S> {
    inner: S,
    frames_read: u64,
}

impl<S: ByteSource> FrameReader<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            frames_read: 0,
        }
    }

    /// Read the next line as a raw frame (bounded by the source's timeout).
    ///
    /// Returns `Ok(None)` when no complete line is available yet.
    pub fn read_frame(&mut self) -> Result<Option<RawFrame>> {
        match self.inner.read_line()? {
            Some(line) => {
                self.frames_read += 1;
                trace!(len = line.len(), seq = self.frames_read, "raw frame");
                Ok(Some(RawFrame::new(line)))
            }
            None => Ok(None),
        }
    }

    /// Lines read since this reader was created.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
