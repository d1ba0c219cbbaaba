//! Frame shape checks.
//!
//! Two modes are offered. [`ValidationMode::Lenient`] reproduces the frame
//! contract the firmware has always been held to: the right length, every
//! marker letter present somewhere, and a delimiter present somewhere. It
//! does not anchor anything to a position, so a frame with transposed markers
//! or non-digit fields still passes and decodes to garbage.
//! [`ValidationMode::Strict`] anchors markers, digits and the delimiter to
//! their offsets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{
    RawFrame, ValidatedFrame, DELIMITER, FIELD_OFFSETS, FIELD_WIDTH, FRAME_LEN, MARKERS,
    MARKER_OFFSETS,
};
use crate::error::{FrameError, Result};

/// How much of the frame layout is checked before decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Length, marker presence and delimiter presence only.
    #[default]
    Lenient,
    /// Every byte checked against its position.
    Strict,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => Err(format!("unknown validation mode: {other}")),
        }
    }
}

/// Turns untrusted [`RawFrame`]s into [`ValidatedFrame`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameValidator {
    mode: ValidationMode,
}

impl FrameValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Check `raw` and hand back the same bytes as a [`ValidatedFrame`].
    ///
    /// Any byte sequence is accepted as input. A rejected frame is consumed;
    /// the error says why.
    pub fn validate(&self, raw: RawFrame) -> Result<ValidatedFrame> {
        if raw.len() != FRAME_LEN {
            return Err(FrameError::WrongLength {
                len: raw.len(),
                expected: FRAME_LEN,
            });
        }

        match self.mode {
            ValidationMode::Lenient => check_presence(raw.as_bytes())?,
            ValidationMode::Strict => check_layout(raw.as_bytes())?,
        }

        Ok(ValidatedFrame::from_checked(raw))
    }
}

/// Validate with the default lenient rules.
pub fn validate(raw: RawFrame) -> Result<ValidatedFrame> {
    FrameValidator::default().validate(raw)
}

fn check_presence(bytes: &[u8]) -> Result<()> {
    if let Some(&missing) = MARKERS.iter().find(|m| !bytes.contains(m)) {
        return Err(FrameError::MissingMarker(char::from(missing)));
    }
    if !bytes.contains(&DELIMITER) {
        return Err(FrameError::MissingDelimiter);
    }
    Ok(())
}

fn check_layout(bytes: &[u8]) -> Result<()> {
    if bytes[FRAME_LEN - 1] != DELIMITER {
        return Err(FrameError::MissingDelimiter);
    }

    for (&offset, &marker) in MARKER_OFFSETS.iter().zip(MARKERS.iter()) {
        if bytes[offset] != marker {
            return Err(FrameError::MisplacedMarker {
                offset,
                expected: char::from(marker),
                found: bytes[offset],
            });
        }
    }

    for &start in &FIELD_OFFSETS {
        for offset in start..start + FIELD_WIDTH {
            if !bytes[offset].is_ascii_digit() {
                return Err(FrameError::NonDigit {
                    offset,
                    found: bytes[offset],
                });
            }
        }
    }

    Ok(())
}
