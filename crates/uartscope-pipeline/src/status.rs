use std::fmt;
use std::sync::mpsc::Sender;

use tracing::{error, info};

/// Connection and throughput notices for whatever is showing them.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// The device opened; carries the configuration summary.
    Connected(String),
    Disconnected,
    /// The device could not be opened.
    OpenError(String),
    /// The device failed while open.
    Critical(String),
    /// Average frame rate over the last window and the plot's point total.
    Fps { fps: f64, points: usize },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Connected(summary) => write!(f, "Connected to {summary}"),
            Status::Disconnected => f.write_str("Disconnected"),
            Status::OpenError(_) => f.write_str("Open error"),
            Status::Critical(reason) => write!(f, "Critical error: {reason}"),
            Status::Fps { fps, points } => {
                write!(f, "{fps:.0} FPS, Total Data points: {points}")
            }
        }
    }
}

impl Status {
    /// Emit this status through `tracing` at a level matching its severity.
    pub fn log(&self) {
        match self {
            Status::OpenError(reason) => error!(reason = %reason, "device open failed"),
            Status::Critical(reason) => error!(reason = %reason, "device lost"),
            Status::Fps { fps, points } => info!(fps = *fps, points, "throughput"),
            other => info!(status = %other, "status"),
        }
    }
}

/// Receives status notices from the poll loop.
pub trait StatusSink {
    fn publish(&mut self, status: &Status);
}

impl<F: FnMut(&Status)> StatusSink for F {
    fn publish(&mut self, status: &Status) {
        self(status)
    }
}

/// Forwards to another thread. A hung-up receiver is ignored.
impl StatusSink for Sender<Status> {
    fn publish(&mut self, status: &Status) {
        let _ = self.send(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn display_matches_status_bar_text() {
        assert_eq!(
            Status::Connected("/dev/ttyUSB0 : 9600, 8, None, 1, None".into()).to_string(),
            "Connected to /dev/ttyUSB0 : 9600, 8, None, 1, None"
        );
        assert_eq!(Status::Disconnected.to_string(), "Disconnected");
        assert_eq!(Status::OpenError("busy".into()).to_string(), "Open error");
        assert_eq!(
            Status::Fps {
                fps: 29.6,
                points: 1200
            }
            .to_string(),
            "30 FPS, Total Data points: 1200"
        );
    }

    #[test]
    fn closures_and_channels_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |status: &Status| seen.push(status.clone());
            sink.publish(&Status::Disconnected);
        }
        assert_eq!(seen, vec![Status::Disconnected]);

        let (mut tx, rx) = mpsc::channel();
        tx.publish(&Status::Connected("COM3".into()));
        assert_eq!(rx.recv().expect("status should arrive"), Status::Connected("COM3".into()));

        drop(rx);
        tx.publish(&Status::Disconnected);
    }
}
