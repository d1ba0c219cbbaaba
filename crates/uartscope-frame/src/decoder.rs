use chrono::{DateTime, Local};

use crate::channel::Channel;
use crate::clock::{Clock, MonotonicClock};
use crate::codec::ValidatedFrame;
use crate::sample::Sample;

/// Extracts channel readings from validated frames and stamps them.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder<C = MonotonicClock> {
    clock: C,
}

impl<C: Clock> FrameDecoder<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Decode `frame`, stamping it with the clock's current time.
    ///
    /// Never fails: the validator already guaranteed every field offset is in
    /// range.
    pub fn decode(&self, frame: ValidatedFrame) -> Sample {
        decode_at(frame, self.clock.now(), self.clock.elapsed())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Decode `frame` with explicit timestamps.
pub fn decode_at(frame: ValidatedFrame, captured_at: DateTime<Local>, elapsed: f64) -> Sample {
    Sample::new(channel_values(&frame), captured_at, elapsed)
}

/// The six channel readings of `frame`, in frame order.
pub fn channel_values(frame: &ValidatedFrame) -> [i32; 6] {
    Channel::ALL.map(|channel| frame.field(channel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::codec::{frame_bytes, RawFrame, FRAME_LEN};
    use crate::validate::validate;

    fn validated(bytes: &[u8]) -> ValidatedFrame {
        validate(RawFrame::new(bytes.to_vec())).unwrap()
    }

    #[test]
    fn decodes_hundreds_at_designated_offsets() {
        let frame = validated(&frame_bytes(&[100, 200, 300, 400, 500, 600]).unwrap());
        assert_eq!(channel_values(&frame), [100, 200, 300, 400, 500, 600]);
    }

    #[test]
    fn decodes_frame_recovered_from_padded_capture() {
        // Capture with 0xff filler between channel groups; stripping the
        // filler leaves exactly one frame.
        let capture = b"\xffa001\xffb002\xffc003\xffd004\xffe005\xfff006\n";
        let frame: Vec<u8> = capture.iter().copied().filter(|&b| b != 0xff).collect();
        assert_eq!(frame.len(), FRAME_LEN);

        let sample = FrameDecoder::new(ManualClock::new()).decode(validated(&frame));
        assert_eq!(sample.channels(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn garbage_digits_pass_through_unguarded() {
        // ' ' is 0x20, sixteen below '0'.
        let frame = validated(b"a 00b0:0c999d000e5\x7f0f006\n");
        let values = channel_values(&frame);
        assert_eq!(values[0], -1600);
        assert_eq!(values[1], 100);
        assert_eq!(values[2], 999);
        assert_eq!(values[4], 500 + 10 * (0x7f - 0x30));
    }

    #[test]
    fn stamps_elapsed_key_from_clock() {
        let clock = ManualClock::new();
        clock.set(12.5);
        let decoder = FrameDecoder::new(clock.clone());

        let sample = decoder.decode(validated(b"a010b020c030d040e050f060\n"));
        assert_eq!(sample.elapsed(), 12.5);
        assert_eq!(sample.value(Channel::F), 60);
        assert!(sample.in_range());
        assert_eq!(sample.timestamp().len(), "00:00:00.000".len());
    }
}
