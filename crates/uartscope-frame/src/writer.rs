use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::channel::CHANNEL_COUNT;
use crate::codec::{encode_frame, FRAME_LEN};
use crate::error::{FrameError, Result};

/// Writes well-formed frames to any `Write` stream.
///
/// Used to emulate a device: the simulator points one at a serial port or at
/// stdout to produce captures.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    frames_written: u64,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_LEN),
            frames_written: 0,
        }
    }

    /// Encode and write one frame (blocking).
    pub fn send(&mut self, values: &[u16; CHANNEL_COUNT]) -> Result<()> {
        self.buf.clear();
        encode_frame(values, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    return Err(FrameError::Io(std::io::Error::from(
                        ErrorKind::WriteZero,
                    )))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.frames_written += 1;
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
