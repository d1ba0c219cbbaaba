use bytes::{BufMut, Bytes, BytesMut};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::error::{FrameError, Result};

/// Total frame size, delimiter included.
pub const FRAME_LEN: usize = 25;

/// Digits per channel field.
pub const FIELD_WIDTH: usize = 3;

/// Offset of the first digit of each channel field.
pub const FIELD_OFFSETS: [usize; CHANNEL_COUNT] = [1, 5, 9, 13, 17, 21];

/// Offset of each channel marker letter in a well-formed frame.
pub const MARKER_OFFSETS: [usize; CHANNEL_COUNT] = [0, 4, 8, 12, 16, 20];

/// Channel marker letters.
pub const MARKERS: [u8; CHANNEL_COUNT] = *b"abcdef";

/// Line delimiter terminating every frame.
pub const DELIMITER: u8 = b'\n';

/// Largest value a three-digit field can carry.
pub const MAX_VALUE: u16 = 999;

/// An untrusted line of bytes as it came off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Bytes,
}

impl RawFrame {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// A frame that passed validation.
///
/// Only the validator can build one, so holding a `ValidatedFrame` is proof
/// that its length is exactly [`FRAME_LEN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrame {
    bytes: Bytes,
}

impl ValidatedFrame {
    pub(crate) fn from_checked(raw: RawFrame) -> Self {
        debug_assert_eq!(raw.len(), FRAME_LEN);
        Self { bytes: raw.bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Raw value of one channel's three-digit field.
    ///
    /// The field is read positionally with no digit check: bytes outside
    /// `'0'..='9'` yield values outside `0..=999`, possibly negative.
    pub fn field(&self, channel: Channel) -> i32 {
        let offset = FIELD_OFFSETS[channel.index()];
        self.bytes[offset..offset + FIELD_WIDTH]
            .iter()
            .fold(0i32, |acc, &b| acc * 10 + (i32::from(b) - i32::from(b'0')))
    }
}

/// Encode six channel readings into the wire format.
///
/// Wire format:
/// ```text
/// offset  0    1..3  4    5..7  8    9..11  12   13..15  16   17..19  20   21..23  24
///         'a'  A     'b'  B     'c'  C      'd'  D       'e'  E       'f'  F       '\n'
/// ```
/// Each field is zero-padded decimal, most significant digit first.
pub fn encode_frame(values: &[u16; CHANNEL_COUNT], dst: &mut BytesMut) -> Result<()> {
    for channel in Channel::ALL {
        let value = values[channel.index()];
        if value > MAX_VALUE {
            return Err(FrameError::ValueOutOfRange { channel, value });
        }
    }

    dst.reserve(FRAME_LEN);
    for channel in Channel::ALL {
        let value = values[channel.index()];
        dst.put_u8(channel.marker());
        dst.put_u8(b'0' + (value / 100) as u8);
        dst.put_u8(b'0' + (value / 10 % 10) as u8);
        dst.put_u8(b'0' + (value % 10) as u8);
    }
    dst.put_u8(DELIMITER);
    Ok(())
}

/// Encode six channel readings into a standalone frame.
pub fn frame_bytes(values: &[u16; CHANNEL_COUNT]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(FRAME_LEN);
    encode_frame(values, &mut buf)?;
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{FrameValidator, ValidationMode};

    #[test]
    fn encodes_reference_frame() {
        let bytes = frame_bytes(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(bytes.as_ref(), b"a001b002c003d004e005f006\n");
        assert_eq!(bytes.len(), FRAME_LEN);
    }

    #[test]
    fn encoded_frames_pass_both_validation_modes() {
        for values in [[0, 0, 0, 0, 0, 0], [999, 10, 250, 7, 400, 123]] {
            let bytes = frame_bytes(&values).unwrap();
            for mode in [ValidationMode::Lenient, ValidationMode::Strict] {
                let frame = FrameValidator::new(mode)
                    .validate(RawFrame::new(bytes.clone()))
                    .unwrap();
                let decoded: Vec<i32> = Channel::ALL.iter().map(|&c| frame.field(c)).collect();
                let expected: Vec<i32> = values.iter().map(|&v| i32::from(v)).collect();
                assert_eq!(decoded, expected);
            }
        }
    }

    #[test]
    fn rejects_values_above_three_digits() {
        let mut buf = BytesMut::new();
        let err = encode_frame(&[0, 0, 1000, 0, 0, 0], &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ValueOutOfRange {
                channel: Channel::C,
                value: 1000
            }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn raw_frame_accessors() {
        let raw = RawFrame::new(&b"abc\n"[..]);
        assert_eq!(raw.len(), 4);
        assert!(!raw.is_empty());
        assert_eq!(raw.as_bytes(), b"abc\n");
        assert_eq!(raw.into_bytes().as_ref(), b"abc\n");
    }
}
