//! The six telemetry channels.
//!
//! Each channel is announced in the frame by its lowercase marker letter and
//! carries one three-digit reading.

use std::fmt;

/// Number of channels in every frame.
pub const CHANNEL_COUNT: usize = 6;

/// One of the six telemetry streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Channel {
    /// All channels in frame order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::A,
        Channel::B,
        Channel::C,
        Channel::D,
        Channel::E,
        Channel::F,
    ];

    /// Zero-based position in the frame.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Marker byte that precedes this channel's digits.
    pub fn marker(self) -> u8 {
        b'a' + self as u8
    }

    pub fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            b'a'..=b'f' => Self::from_index(usize::from(marker - b'a')),
            _ => None,
        }
    }

    /// Display name (`A`..`F`).
    pub fn name(self) -> &'static str {
        match self {
            Channel::A => "A",
            Channel::B => "B",
            Channel::C => "C",
            Channel::D => "D",
            Channel::E => "E",
            Channel::F => "F",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_frame_order() {
        let markers: Vec<u8> = Channel::ALL.iter().map(|c| c.marker()).collect();
        assert_eq!(markers, b"abcdef");
    }

    #[test]
    fn index_and_marker_lookups_agree() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_index(channel.index()), Some(channel));
            assert_eq!(Channel::from_marker(channel.marker()), Some(channel));
        }
        assert_eq!(Channel::from_index(6), None);
        assert_eq!(Channel::from_marker(b'g'), None);
    }
}
