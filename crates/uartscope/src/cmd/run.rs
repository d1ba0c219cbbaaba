use std::path::PathBuf;
use std::time::Duration;

use uartscope_frame::Sample;
use uartscope_pipeline::{CsvLog, NullSink, PersistenceSink, PlotBuffer, PollLoop, Status};
use uartscope_transport::SerialPortSource;

use crate::cmd::{install_ctrlc_handler, parse_duration, RunArgs};
use crate::config::{PipelineArgs, ScopeConfig};
use crate::exit::{pipeline_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_sample, print_summary, OutputFormat};

type DeviceLoop = PollLoop<SerialPortSource, PlotBuffer, ConsoleLog>;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = args.serial.resolve()?;
    args.pipeline.apply(&mut config);
    if let Some(cadence) = &args.cadence {
        let cadence = parse_duration(cadence)?;
        config.pipeline.cadence_ms = u64::try_from(cadence.as_millis()).unwrap_or(u64::MAX);
    }
    if let Some(frames) = args.frames_per_tick {
        config.pipeline.frames_per_tick = frames;
    }
    if config.serial.port_name.is_empty() {
        return Err(CliError::new(
            USAGE,
            "no port given (use --port or a config file)",
        ));
    }
    let duration = args.duration.as_deref().map(parse_duration).transpose()?;

    let log = ConsoleLog::new(&config, &args.pipeline, args.print.then_some(format));
    let log_path = log.path();
    let plot = PlotBuffer::new(config.pipeline.plot_capacity);
    let mut pipeline = PollLoop::new(SerialPortSource::new(), plot, log, config.pipeline.clone())
        .with_status_sink(move |status: &Status| {
            if format.is_human() {
                eprintln!("{status}");
            }
        });

    pipeline
        .open(&config.serial)
        .map_err(|err| pipeline_error("open failed", err))?;

    let result = drive(&mut pipeline, duration);
    pipeline.close();
    print_summary(
        &config.serial.port_name,
        log_path.as_deref(),
        pipeline.stats(),
        format,
    );
    result.map(|()| SUCCESS)
}

#[cfg(not(feature = "async"))]
fn drive(pipeline: &mut DeviceLoop, duration: Option<Duration>) -> CliResult<()> {
    let handle = pipeline.close_handle();
    let on_interrupt = handle.clone();
    install_ctrlc_handler(move || on_interrupt.request_close())?;

    if let Some(limit) = duration {
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            handle.request_close();
        });
    }

    pipeline
        .run_blocking()
        .map_err(|err| pipeline_error("device lost", err))
}

#[cfg(feature = "async")]
fn drive(pipeline: &mut DeviceLoop, duration: Option<Duration>) -> CliResult<()> {
    use tokio_util::sync::CancellationToken;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| crate::exit::io_error("runtime setup failed", err))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    install_ctrlc_handler(move || on_interrupt.cancel())?;

    runtime
        .block_on(async move {
            if let Some(limit) = duration {
                let expiry = cancel.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(limit).await;
                    expiry.cancel();
                });
            }
            uartscope_pipeline::driver::run(pipeline, cancel).await
        })
        .map_err(|err| pipeline_error("device lost", err))
}

/// Persistence sink for the CLI: the CSV log (unless disabled), optionally
/// echoing each sample to stdout first.
pub(crate) struct ConsoleLog {
    inner: Box<dyn PersistenceSink + Send>,
    path: Option<PathBuf>,
    echo: Option<OutputFormat>,
}

impl ConsoleLog {
    pub(crate) fn new(
        config: &ScopeConfig,
        args: &PipelineArgs,
        echo: Option<OutputFormat>,
    ) -> Self {
        if args.no_log {
            return Self {
                inner: Box::new(NullSink),
                path: None,
                echo,
            };
        }
        Self {
            inner: Box::new(CsvLog::new(&config.log_path)),
            path: Some(config.log_path.clone()),
            echo,
        }
    }

    pub(crate) fn path(&self) -> Option<PathBuf> {
        self.path.clone()
    }
}

impl PersistenceSink for ConsoleLog {
    fn record(&mut self, sample: &Sample) -> std::io::Result<()> {
        if let Some(format) = self.echo {
            print_sample(sample, format);
        }
        self.inner.record(sample)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
