use uartscope_transport::TransportError;

use crate::channel::Channel;

/// Errors that can occur while reading, validating or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The line is not exactly one frame long.
    #[error("wrong frame length ({len} bytes, expected {expected})")]
    WrongLength { len: usize, expected: usize },

    /// A channel marker letter does not occur anywhere in the frame.
    #[error("missing channel marker '{0}'")]
    MissingMarker(char),

    /// The frame carries no line delimiter.
    #[error("missing line delimiter")]
    MissingDelimiter,

    /// Strict mode: a marker position holds the wrong byte.
    #[error("expected '{expected}' at offset {offset}, found 0x{found:02x}")]
    MisplacedMarker {
        offset: usize,
        expected: char,
        found: u8,
    },

    /// Strict mode: a digit position holds a non-digit byte.
    #[error("non-digit byte 0x{found:02x} at offset {offset}")]
    NonDigit { offset: usize, found: u8 },

    /// A value handed to the encoder does not fit in three digits.
    #[error("channel {channel} value {value} exceeds 999")]
    ValueOutOfRange { channel: Channel, value: u16 },

    /// An I/O error occurred while writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source failed underneath the reader.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// Whether this error only concerns the shape of one frame.
    ///
    /// Such frames are skipped; the stream itself is still healthy.
    pub fn is_invalid_frame(&self) -> bool {
        matches!(
            self,
            FrameError::WrongLength { .. }
                | FrameError::MissingMarker(_)
                | FrameError::MissingDelimiter
                | FrameError::MisplacedMarker { .. }
                | FrameError::NonDigit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
