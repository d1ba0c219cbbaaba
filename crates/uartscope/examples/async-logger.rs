//! Drive the pipeline from a tokio interval and stop it after a fixed time.
//!
//! Run with:
//!   cargo run --example async-logger --features async -- /dev/ttyUSB0 10

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uartscope::pipeline::{driver, CsvLog, PipelineConfig, PlotBuffer, PollLoop, SampleSink};
use uartscope::transport::{SerialConfig, SerialPortSource};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().ok_or("usage: async-logger PORT [SECONDS]")?;
    let seconds: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 10,
    };

    let mut pipeline = PollLoop::new(
        SerialPortSource::new(),
        PlotBuffer::default(),
        CsvLog::default(),
        PipelineConfig::default(),
    )
    .with_status_sink(|status: &uartscope::pipeline::Status| eprintln!("{status}"));
    pipeline.open(&SerialConfig::new(port))?;

    let cancel = CancellationToken::new();
    let timer = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        timer.cancel();
    });

    driver::run(&mut pipeline, cancel).await?;
    eprintln!("plotted {} points", pipeline.plot().point_count());
    Ok(())
}
