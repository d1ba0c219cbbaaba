use uartscope_transport::TransportError;

/// Errors surfaced by the poll loop.
///
/// Only device-level failures reach the caller; invalid frames and
/// persistence hiccups are handled inside the loop.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The device could not be opened. The loop stays closed.
    #[error("open failed: {0}")]
    Open(#[source] TransportError),

    /// The device failed fatally while open. The loop has been closed.
    #[error("device lost: {0}")]
    Resource(#[source] TransportError),

    /// `open` was called while the loop was already running.
    #[error("pipeline is already open")]
    AlreadyOpen,

    /// A non-fatal transport error outside the read path.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl PipelineError {
    /// Whether the loop was forced closed by this error.
    pub fn closed_pipeline(&self) -> bool {
        matches!(self, PipelineError::Resource(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
