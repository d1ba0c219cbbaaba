use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use uartscope_pipeline::{PlotBuffer, PollLoop};
use uartscope_transport::{ReplaySource, SerialConfig};

use crate::cmd::run::ConsoleLog;
use crate::cmd::ReplayArgs;
use crate::config::ScopeConfig;
use crate::exit::{io_error, pipeline_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = ScopeConfig::load_or_default(args.config.as_deref())?;
    args.pipeline.apply(&mut config);
    // No cadence in a replay: each poll drains everything available.
    config.pipeline.frames_per_tick = usize::MAX;

    let (capture, label) = open_capture(&args.capture)?;
    let log = ConsoleLog::new(&config, &args.pipeline, args.print.then_some(format));
    let log_path = log.path();
    let mut pipeline = PollLoop::new(
        ReplaySource::with_label(capture, label.clone()),
        PlotBuffer::new(config.pipeline.plot_capacity),
        log,
        config.pipeline.clone(),
    );

    pipeline
        .open(&SerialConfig::new(label.clone()))
        .map_err(|err| pipeline_error("replay failed", err))?;
    while pipeline.is_open() && !pipeline.source().is_exhausted() {
        pipeline
            .poll()
            .map_err(|err| pipeline_error("replay failed", err))?;
    }
    pipeline.close();

    print_summary(&label, log_path.as_deref(), pipeline.stats(), format);
    Ok(SUCCESS)
}

fn open_capture(path: &Path) -> CliResult<(Box<dyn Read>, String)> {
    if path == Path::new("-") {
        return Ok((Box::new(std::io::stdin().lock()), "stdin".to_string()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok((Box::new(BufReader::new(file)), path.display().to_string()))
}
