//! Fixed-width six-channel ASCII telemetry frames.
//!
//! Every frame is exactly 25 bytes:
//! - six groups of a marker letter (`a`..`f`) followed by three decimal digits
//! - a trailing `\n`
//!
//! Raw lines are checked by [`FrameValidator`] and only a [`ValidatedFrame`]
//! can be decoded into a [`Sample`]; there is no other way to build one.

pub mod channel;
pub mod clock;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod sample;
pub mod validate;
pub mod writer;

pub use channel::{Channel, CHANNEL_COUNT};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use codec::{
    encode_frame, frame_bytes, RawFrame, ValidatedFrame, DELIMITER, FIELD_OFFSETS, FIELD_WIDTH,
    FRAME_LEN, MARKERS, MARKER_OFFSETS, MAX_VALUE,
};
pub use decoder::{channel_values, decode_at, FrameDecoder};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use sample::{Sample, TIMESTAMP_FORMAT};
pub use validate::{validate, FrameValidator, ValidationMode};
pub use writer::FrameWriter;
