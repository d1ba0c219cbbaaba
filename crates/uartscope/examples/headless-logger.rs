//! Headless logger: open a port, log every frame to CSV, print the frame
//! rate as it is reported.
//!
//! Run with:
//!   cargo run --example headless-logger -- /dev/ttyUSB0 115200
//!
//! Stop with Ctrl-C or unplug the device.

use std::sync::mpsc;
use std::thread;

use uartscope::pipeline::{CsvLog, PipelineConfig, PlotBuffer, PollLoop, Status};
use uartscope::transport::{SerialConfig, SerialPortSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().ok_or("usage: headless-logger PORT [BAUD]")?;
    let baud = match args.next() {
        Some(baud) => baud.parse()?,
        None => uartscope::transport::DEFAULT_BAUD_RATE,
    };

    let (tx, rx) = mpsc::channel::<Status>();
    let printer = thread::spawn(move || {
        for status in rx {
            eprintln!("{status}");
        }
    });

    let config = PipelineConfig {
        cadence_ms: 100,
        frames_per_tick: 32,
        ..PipelineConfig::default()
    };
    let mut pipeline = PollLoop::new(
        SerialPortSource::new(),
        PlotBuffer::default(),
        CsvLog::default(),
        config,
    )
    .with_status_sink(tx);

    pipeline.open(&SerialConfig::new(port).with_baud_rate(baud))?;
    let result = pipeline.run_blocking();

    let stats = pipeline.stats();
    eprintln!(
        "decoded {} frames ({} invalid), {} written to {}",
        stats.decoded,
        stats.invalid,
        pipeline.log().records(),
        pipeline.log().path().display()
    );

    drop(pipeline);
    let _ = printer.join();
    result.map_err(Into::into)
}
