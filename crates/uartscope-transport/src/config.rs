//! Serial device configuration.
//!
//! [`SerialConfig`] is the value object handed to [`ByteSource::open`]. Every
//! field renders to a short string for status display, and the whole struct
//! round-trips through serde so it can live in a config file.
//!
//! [`ByteSource::open`]: crate::ByteSource::open

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Default line speed.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataBits {
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[default]
    #[serde(rename = "8")]
    Eight,
}

impl DataBits {
    pub fn as_str(self) -> &'static str {
        match self {
            DataBits::Five => "5",
            DataBits::Six => "6",
            DataBits::Seven => "7",
            DataBits::Eight => "8",
        }
    }
}

impl FromStr for DataBits {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(DataBits::Five),
            "6" => Ok(DataBits::Six),
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            other => Err(TransportError::InvalidSetting {
                field: "data bits",
                value: other.to_string(),
            }),
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl Parity {
    pub fn as_str(self) -> &'static str {
        match self {
            Parity::None => "None",
            Parity::Even => "Even",
            Parity::Odd => "Odd",
        }
    }
}

impl FromStr for Parity {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "even" | "e" => Ok(Parity::Even),
            "odd" | "o" => Ok(Parity::Odd),
            _ => Err(TransportError::InvalidSetting {
                field: "parity",
                value: s.to_string(),
            }),
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopBits {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl StopBits {
    pub fn as_str(self) -> &'static str {
        match self {
            StopBits::One => "1",
            StopBits::Two => "2",
        }
    }
}

impl FromStr for StopBits {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(StopBits::One),
            "2" => Ok(StopBits::Two),
            other => Err(TransportError::InvalidSetting {
                field: "stop bits",
                value: other.to_string(),
            }),
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    #[default]
    None,
    /// RTS/CTS.
    Hardware,
    /// XON/XOFF.
    Software,
}

impl FlowControl {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowControl::None => "None",
            FlowControl::Hardware => "RTS/CTS",
            FlowControl::Software => "XON/XOFF",
        }
    }
}

impl FromStr for FlowControl {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FlowControl::None),
            "hardware" | "rts/cts" | "rtscts" => Ok(FlowControl::Hardware),
            "software" | "xon/xoff" | "xonxoff" => Ok(FlowControl::Software),
            _ => Err(TransportError::InvalidSetting {
                field: "flow control",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(DataBits, Parity, StopBits, FlowControl);

/// Everything needed to open a serial device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path or name (`/dev/ttyUSB0`, `COM3`).
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Echo bytes written to the device back to the local console.
    pub local_echo: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            flow_control: FlowControl::default(),
            local_echo: true,
        }
    }
}

impl SerialConfig {
    /// Config for `port_name` with every other field at its default.
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Baud rate rendered for status display.
    pub fn baud_rate_string(&self) -> String {
        self.baud_rate.to_string()
    }

    /// `PORT : baud, databits, parity, stopbits, flowcontrol`.
    pub fn summary(&self) -> String {
        format!(
            "{} : {}, {}, {}, {}, {}",
            self.port_name,
            self.baud_rate_string(),
            self.data_bits,
            self.parity,
            self.stop_bits,
            self.flow_control
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_9600_8n1() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.stop_bits, StopBits::One);
        assert_eq!(cfg.flow_control, FlowControl::None);
    }

    #[test]
    fn summary_renders_every_field() {
        let mut cfg = SerialConfig::new("/dev/ttyUSB0").with_baud_rate(115_200);
        cfg.flow_control = FlowControl::Hardware;
        assert_eq!(cfg.summary(), "/dev/ttyUSB0 : 115200, 8, None, 1, RTS/CTS");
    }

    #[test]
    fn parses_settings_case_insensitively() {
        assert_eq!("EVEN".parse::<Parity>().unwrap(), Parity::Even);
        assert_eq!("xon/xoff".parse::<FlowControl>().unwrap(), FlowControl::Software);
        assert_eq!("7".parse::<DataBits>().unwrap(), DataBits::Seven);
        assert_eq!("2".parse::<StopBits>().unwrap(), StopBits::Two);
    }

    #[test]
    fn rejects_unknown_settings() {
        let err = "9".parse::<DataBits>().unwrap_err();
        assert!(matches!(
            err,
            TransportError::InvalidSetting {
                field: "data bits",
                ..
            }
        ));
        assert!("mark".parse::<Parity>().is_err());
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: SerialConfig =
            serde_json::from_str(r#"{"port_name":"COM3","baud_rate":57600,"parity":"odd"}"#)
                .unwrap();
        assert_eq!(cfg.port_name, "COM3");
        assert_eq!(cfg.baud_rate, 57600);
        assert_eq!(cfg.parity, Parity::Odd);
        assert_eq!(cfg.data_bits, DataBits::Eight);
    }
}
