/// Errors that can occur on a serial byte-stream source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device rejected the open request.
    #[error("failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    /// The device went away or failed in a way that cannot be recovered
    /// (unplugged, permission revoked, driver error).
    #[error("device resource error: {0}")]
    Resource(String),

    /// A recoverable I/O error on the stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation needed an open source.
    #[error("source is not open")]
    NotOpen,

    /// `open` was called on a source that is already open.
    #[error("source is already open")]
    AlreadyOpen,

    /// A configuration value could not be parsed.
    #[error("invalid {field}: {value}")]
    InvalidSetting { field: &'static str, value: String },
}

impl TransportError {
    /// Whether this error must force the pipeline closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Resource(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
