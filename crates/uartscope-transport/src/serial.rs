use std::io::{ErrorKind, Write};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serialport::SerialPort;
use tracing::{debug, info};

use crate::config::{DataBits, FlowControl, Parity, SerialConfig, StopBits};
use crate::error::{Result, TransportError};
use crate::line::LineReader;
use crate::traits::ByteSource;

/// Default per-read timeout on the device.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A [`ByteSource`] backed by a physical (or virtual) serial port.
pub struct SerialPortSource {
    port: Option<LineReader<Box<dyn SerialPort>>>,
    port_name: String,
    read_timeout: Duration,
}

impl SerialPortSource {
    pub fn new() -> Self {
        Self::with_read_timeout(DEFAULT_READ_TIMEOUT)
    }

    /// Source whose reads give up after `read_timeout`.
    pub fn with_read_timeout(read_timeout: Duration) -> Self {
        Self {
            port: None,
            port_name: String::new(),
            read_timeout,
        }
    }

    /// Name of the currently open port, empty when closed.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn port_mut(&mut self) -> Result<&mut LineReader<Box<dyn SerialPort>>> {
        self.port.as_mut().ok_or(TransportError::NotOpen)
    }
}

impl Default for SerialPortSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for SerialPortSource {
    fn open(&mut self, config: &SerialConfig) -> Result<()> {
        if self.port.is_some() {
            return Err(TransportError::AlreadyOpen);
        }

        let port = serialport::new(&config.port_name, config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .flow_control(flow_control(config.flow_control))
            .timeout(self.read_timeout)
            .open()
            .map_err(|err| TransportError::Open {
                port: config.port_name.clone(),
                reason: err.to_string(),
            })?;

        info!(port = %config.port_name, baud = config.baud_rate, "serial port opened");
        self.port_name = config.port_name.clone();
        self.port = Some(LineReader::new(port).with_budget(self.read_timeout));
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!(port = %self.port_name, "serial port closed");
        }
        self.port_name.clear();
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn wait_for_ready(&mut self, timeout: Duration) -> Result<bool> {
        let reader = self.port_mut()?;
        if reader.buffered() > 0 {
            return Ok(true);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let pending = reader
                .get_ref()
                .bytes_to_read()
                .map_err(|err| TransportError::Resource(err.to_string()))?;
            if pending > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
    }

    fn read_line(&mut self) -> Result<Option<Bytes>> {
        let reader = self.port_mut()?;
        match reader.read_line() {
            Ok(line) => {
                if reader.is_eof() {
                    return Err(TransportError::Resource(
                        "device reported end of stream".to_string(),
                    ));
                }
                Ok(line)
            }
            Err(err) => Err(classify(err)),
        }
    }

    fn read_available(&mut self, max: usize) -> Result<Bytes> {
        self.port_mut()?.read_available(max).map_err(classify)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let port = self.port_mut()?.get_mut();
        port.write_all(data).map_err(classify)?;
        port.flush().map_err(classify)?;
        debug!(len = data.len(), "wrote to serial port");
        Ok(data.len())
    }
}

/// Map an I/O error from the device into the transport taxonomy.
///
/// Anything that indicates the device itself is gone is a resource error.
fn classify(err: std::io::Error) -> TransportError {
    match err.kind() {
        ErrorKind::BrokenPipe
        | ErrorKind::NotConnected
        | ErrorKind::NotFound
        | ErrorKind::PermissionDenied
        | ErrorKind::UnexpectedEof
        | ErrorKind::Other => TransportError::Resource(err.to_string()),
        _ => TransportError::Io(err),
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn flow_control(flow: FlowControl) -> serialport::FlowControl {
    match flow {
        FlowControl::None => serialport::FlowControl::None,
        FlowControl::Hardware => serialport::FlowControl::Hardware,
        FlowControl::Software => serialport::FlowControl::Software,
    }
}

/// A serial port visible to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    /// `usb`, `bluetooth`, `pci` or `unknown`.
    pub kind: &'static str,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid_pid: Option<(u16, u16)>,
}

/// Enumerate serial ports on this machine.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(|err| {
        TransportError::Io(std::io::Error::other(format!("port enumeration failed: {err}")))
    })?;

    Ok(ports
        .into_iter()
        .map(|p| match p.port_type {
            serialport::SerialPortType::UsbPort(usb) => PortInfo {
                name: p.port_name,
                kind: "usb",
                manufacturer: usb.manufacturer,
                product: usb.product,
                serial_number: usb.serial_number,
                vid_pid: Some((usb.vid, usb.pid)),
            },
            serialport::SerialPortType::BluetoothPort => PortInfo::plain(p.port_name, "bluetooth"),
            serialport::SerialPortType::PciPort => PortInfo::plain(p.port_name, "pci"),
            serialport::SerialPortType::Unknown => PortInfo::plain(p.port_name, "unknown"),
        })
        .collect())
}

impl PortInfo {
    fn plain(name: String, kind: &'static str) -> Self {
        Self {
            name,
            kind,
            manufacturer: None,
            product: None,
            serial_number: None,
            vid_pid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_on_closed_source_fail_cleanly() {
        let mut source = SerialPortSource::new();
        assert!(!source.is_open());
        assert!(matches!(source.read_line(), Err(TransportError::NotOpen)));
        assert!(matches!(source.write(b"x"), Err(TransportError::NotOpen)));
        assert!(matches!(
            source.wait_for_ready(Duration::from_millis(1)),
            Err(TransportError::NotOpen)
        ));
        source.close();
    }

    #[test]
    fn opening_missing_device_is_open_failure() {
        let mut source = SerialPortSource::new();
        let cfg = SerialConfig::new("/dev/uartscope-does-not-exist");
        let err = source.open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::Open { ref port, .. } if port == "/dev/uartscope-does-not-exist"));
        assert!(!source.is_open());
    }

    #[test]
    fn device_loss_is_fatal() {
        let err = classify(std::io::Error::from(ErrorKind::BrokenPipe));
        assert!(err.is_fatal());
        let err = classify(std::io::Error::from(ErrorKind::InvalidData));
        assert!(!err.is_fatal());
    }
}
