use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::debug;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;

/// Default cap on bytes buffered while waiting for a line delimiter.
pub const DEFAULT_MAX_LINE: usize = 4 * 1024;

/// Splits any `Read` stream into `\n`-terminated lines.
///
/// Handles partial reads internally: a line is only returned once its
/// delimiter has arrived. Read timeouts end the current attempt without
/// losing buffered bytes, so the next call picks up where this one stopped.
///
/// With a budget set, one `read_line` call never keeps reading past it, even
/// when bytes keep trickling in without a delimiter.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    max_line: usize,
    budget: Option<Duration>,
    eof: bool,
}

impl<T: Read> LineReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_max_line(inner, DEFAULT_MAX_LINE)
    }

    pub fn with_max_line(inner: T, max_line: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_line,
            budget: None,
            eof: false,
        }
    }

    /// Bound the total time one `read_line` call spends reading.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Read the next complete line, delimiter included.
    ///
    /// Returns `Ok(None)` when the stream timed out, would block, reached EOF
    /// or the budget ran out before a delimiter arrived. Partial lines stay
    /// buffered except at EOF, where they are dropped. An oversized
    /// unterminated line is discarded and also ends the call.
    pub fn read_line(&mut self) -> std::io::Result<Option<Bytes>> {
        let deadline = self.budget.map(|budget| Instant::now() + budget);
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }
            if self.eof {
                return Ok(None);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(err),
            };

            if read == 0 {
                if !self.buf.is_empty() {
                    debug!(len = self.buf.len(), "dropping unterminated bytes at eof");
                    self.buf.clear();
                }
                self.eof = true;
                return Ok(None);
            }

            self.buf.extend_from_slice(&chunk[..read]);

            if self.buf.len() > self.max_line && !self.buf.contains(&b'\n') {
                debug!(
                    len = self.buf.len(),
                    max = self.max_line,
                    "discarding oversized unterminated line"
                );
                self.buf.clear();
                return Ok(None);
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(None);
            }
        }
    }

    /// Return up to `max` bytes without waiting for a delimiter.
    ///
    /// Buffered bytes are returned first; otherwise one read is attempted.
    /// An empty result means nothing arrived within the stream's timeout.
    pub fn read_available(&mut self, max: usize) -> std::io::Result<Bytes> {
        if self.buf.is_empty() && !self.eof {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            loop {
                match self.inner.read(&mut chunk) {
                    Ok(0) => self.eof = true,
                    Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err)
                        if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
                    Err(err) => return Err(err),
                }
                break;
            }
        }
        let take = max.min(self.buf.len());
        Ok(self.buf.split_to(take).freeze())
    }

    fn take_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        Some(self.buf.split_to(pos + 1).freeze())
    }

    /// Whether the underlying stream has reported EOF.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Bytes received but not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partially received line.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn splits_lines_and_keeps_delimiter() {
        let mut reader = LineReader::new(Cursor::new(b"one\ntwo\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"one\n");
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"two\n");
        assert!(reader.read_line().unwrap().is_none());
        assert!(reader.is_eof());
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: b"a001b002\n".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(byte_reader);
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"a001b002\n");
    }

    #[test]
    fn unterminated_tail_is_dropped_at_eof() {
        let mut reader = LineReader::new(Cursor::new(b"done\npart".to_vec()));
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"done\n");
        assert!(reader.read_line().unwrap().is_none());
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn timeout_keeps_partial_line() {
        let reader = TimeoutBetween {
            chunks: vec![b"a001".to_vec(), b"b002\n".to_vec()],
            timed_out: false,
        };
        let mut reader = LineReader::new(reader);

        assert!(reader.read_line().unwrap().is_none());
        assert_eq!(reader.buffered(), 4);
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"a001b002\n");
    }

    #[test]
    fn read_available_takes_buffered_bytes_first() {
        let mut reader = LineReader::new(Cursor::new(b"ok\nrest".to_vec()));
        assert_eq!(reader.read_available(2).unwrap().as_ref(), b"ok");
        assert_eq!(reader.buffered(), 5);
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"\n");
        assert_eq!(reader.read_available(16).unwrap().as_ref(), b"rest");
        assert!(reader.read_available(16).unwrap().is_empty());
        assert!(reader.is_eof());
    }

    #[test]
    fn oversized_line_is_discarded() {
        let chunks = Chunks(vec![vec![b'x'; 32], b"ok\n".to_vec()]);
        let mut reader = LineReader::with_max_line(chunks, 16);

        assert!(reader.read_line().unwrap().is_none());
        assert_eq!(reader.buffered(), 0);
        assert_eq!(reader.read_line().unwrap().unwrap().as_ref(), b"ok\n");
    }

    #[test]
    fn budget_bounds_a_trickling_line() {
        let trickle = Trickle {
            remaining: 200,
            delay: Duration::from_millis(2),
        };
        let mut reader = LineReader::new(trickle).with_budget(Duration::from_millis(10));

        let started = Instant::now();
        assert!(reader.read_line().unwrap().is_none());
        let took = started.elapsed();
        assert!(took < Duration::from_millis(50), "read_line took {took:?}");
        assert!(reader.buffered() > 0);
        assert!(reader.buffered() < 200);
    }

    #[test]
    fn budget_keeps_partial_bytes_for_the_next_call() {
        let trickle = Trickle {
            remaining: 12,
            delay: Duration::from_millis(2),
        };
        let mut reader = LineReader::new(trickle).with_budget(Duration::from_millis(5));

        let mut line = None;
        for _ in 0..100 {
            line = reader.read_line().unwrap();
            if line.is_some() {
                break;
            }
        }
        let line = line.expect("line should complete across calls");
        assert_eq!(line.len(), 12);
        assert_eq!(line.last(), Some(&b'\n'));
    }

    #[test]
    fn hard_errors_propagate() {
        let mut reader = LineReader::new(Broken);
        let err = reader.read_line().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct TimeoutBetween {
        chunks: Vec<Vec<u8>>,
        timed_out: bool,
    }

    impl Read for TimeoutBetween {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            if self.chunks.len() == 1 && !self.timed_out {
                self.timed_out = true;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    struct Chunks(Vec<Vec<u8>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let chunk = self.0.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    /// Yields one byte per read after a delay, `\n` as the last byte.
    struct Trickle {
        remaining: usize,
        delay: Duration,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining == 0 || buf.is_empty() {
                return Ok(0);
            }
            std::thread::sleep(self.delay);
            self.remaining -= 1;
            buf[0] = if self.remaining == 0 { b'\n' } else { b'x' };
            Ok(1)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }
}
