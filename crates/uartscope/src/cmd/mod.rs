use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::config::{PipelineArgs, SerialArgs};
use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod ports;
pub mod replay;
pub mod run;
pub mod send;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a device and log every decoded frame until interrupted.
    Run(RunArgs),
    /// Feed a recorded capture through the pipeline without delays.
    Replay(ReplayArgs),
    /// Validate and decode frames given on the command line or in a file.
    Decode(DecodeArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Write bytes to a device and print the short reply.
    Send(SendArgs),
    /// Emit well-formed frames to a device or stdout.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// Time between polls (e.g. 900ms, 1s).
    #[arg(long)]
    pub cadence: Option<String>,
    /// Lines read per poll at most.
    #[arg(long)]
    pub frames_per_tick: Option<usize>,
    /// Stop after this long (e.g. 30s, 500ms).
    #[arg(long)]
    pub duration: Option<String>,
    /// Print every decoded sample to stdout.
    #[arg(long)]
    pub print: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file to replay, or `-` for stdin.
    pub capture: PathBuf,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    /// JSON config file (only the `pipeline` and `log_path` sections apply).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Print every decoded sample to stdout.
    #[arg(long)]
    pub print: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frames to decode. A missing trailing newline is added.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub frames: Vec<String>,
    /// Read frames line by line from a file.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
    /// Reject frames whose markers or digits are out of place.
    #[arg(long)]
    pub strict: bool,
    /// Report invalid frames on stderr and keep going.
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    /// Text to write.
    pub data: String,
    /// Append a newline to the data.
    #[arg(long)]
    pub newline: bool,
    /// How long to wait for a reply (e.g. 10ms, 1s).
    #[arg(long, default_value = "10ms")]
    pub wait: String,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Write to this port instead of stdout.
    #[arg(long, short = 'p')]
    pub port: Option<String>,
    /// Baud rate when writing to a port.
    #[arg(long, short = 'b')]
    pub baud: Option<u32>,
    /// Frames to emit; 0 runs until interrupted.
    #[arg(long, short = 'n', default_value = "10")]
    pub count: u64,
    /// Delay between frames (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub interval: String,
    /// Fixed channel values (six, comma-separated). Default: a ramp.
    #[arg(long, value_delimiter = ',')]
    pub values: Option<Vec<u16>>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Run `on_interrupt` on Ctrl-C. Only one handler may be installed per
/// process.
pub fn install_ctrlc_handler(on_interrupt: impl Fn() + Send + 'static) -> CliResult<()> {
    ctrlc::set_handler(on_interrupt).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}

/// Flag cleared by Ctrl-C.
pub fn running_flag() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    install_ctrlc_handler(move || flag.store(false, Ordering::SeqCst))?;
    Ok(running)
}
