use std::fmt;
use std::io;

use uartscope_frame::FrameError;
use uartscope_pipeline::PipelineError;
use uartscope_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::InvalidSetting { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::NotOpen | TransportError::AlreadyOpen => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Transport(source) => transport_error(context, source),
        FrameError::ValueOutOfRange { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other if other.is_invalid_frame() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn pipeline_error(context: &str, err: PipelineError) -> CliError {
    match err {
        PipelineError::Open(source)
        | PipelineError::Resource(source)
        | PipelineError::Transport(source) => transport_error(context, source),
        PipelineError::AlreadyOpen => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_frames_map_to_data_invalid() {
        let err = frame_error(
            "decode failed",
            FrameError::WrongLength {
                len: 3,
                expected: 25,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("decode failed: "));
    }

    #[test]
    fn device_failures_map_to_transport_error() {
        let open = pipeline_error(
            "open failed",
            PipelineError::Open(TransportError::Open {
                port: "/dev/ttyUSB9".to_string(),
                reason: "no such device".to_string(),
            }),
        );
        assert_eq!(open.code, TRANSPORT_ERROR);

        let lost = pipeline_error(
            "run failed",
            PipelineError::Resource(TransportError::Resource("unplugged".to_string())),
        );
        assert_eq!(lost.code, TRANSPORT_ERROR);
    }

    #[test]
    fn bad_settings_are_usage_errors() {
        let err = transport_error(
            "bad flag",
            TransportError::InvalidSetting {
                field: "parity",
                value: "mark".to_string(),
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn timeouts_map_to_124() {
        let err = io_error("read", io::Error::from(io::ErrorKind::TimedOut));
        assert_eq!(err.code, TIMEOUT);
    }
}
