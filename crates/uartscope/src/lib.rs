//! Decode six-channel ASCII telemetry from a serial device, plot-ready and
//! logged.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial configuration and line-oriented byte sources
//! - [`frame`]: frame validation, decoding and encoding
//! - [`pipeline`]: the poll loop, rate limiter, frame-rate counter and sinks

/// Re-export transport types.
pub mod transport {
    pub use uartscope_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use uartscope_frame::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use uartscope_pipeline::*;
}
