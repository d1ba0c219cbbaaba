//! Serial byte-stream sources for uartscope.
//!
//! This is the lowest layer. It owns the device configuration value object
//! ([`SerialConfig`]), the [`ByteSource`] capability the sample pipeline
//! reads from, and two implementations of it:
//! - [`SerialPortSource`] for real devices
//! - [`ReplaySource`] for recorded captures
//!
//! Everything above this crate only ever sees complete `\n`-terminated lines.

pub mod config;
pub mod error;
pub mod line;
pub mod replay;
pub mod serial;
pub mod traits;

pub use config::{DataBits, FlowControl, Parity, SerialConfig, StopBits, DEFAULT_BAUD_RATE};
pub use error::{Result, TransportError};
pub use line::{LineReader, DEFAULT_MAX_LINE};
pub use replay::ReplaySource;
pub use serial::{available_ports, PortInfo, SerialPortSource, DEFAULT_READ_TIMEOUT};
pub use traits::ByteSource;
