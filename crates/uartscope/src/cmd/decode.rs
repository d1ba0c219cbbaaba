use std::fs::File;
use std::io::BufReader;

use tracing::warn;
use uartscope_frame::{
    FrameDecoder, FrameValidator, MonotonicClock, RawFrame, Sample, ValidationMode,
};
use uartscope_transport::LineReader;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_samples, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Lenient
    };

    let lines = match &args.file {
        Some(path) => read_lines(path)?,
        None => args.frames.iter().map(|f| with_newline(f)).collect(),
    };

    let samples = decode_all(lines, mode, args.skip_invalid)?;
    print_samples(&samples, format);
    Ok(SUCCESS)
}

fn decode_all(
    lines: Vec<RawFrame>,
    mode: ValidationMode,
    skip_invalid: bool,
) -> CliResult<Vec<Sample>> {
    let validator = FrameValidator::new(mode);
    let decoder = FrameDecoder::new(MonotonicClock::start());

    let mut samples = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        match validator.validate(line) {
            Ok(frame) => samples.push(decoder.decode(frame)),
            Err(err) if skip_invalid => {
                warn!(frame = index + 1, error = %err, "skipping invalid frame")
            }
            Err(err) => return Err(frame_error(&format!("frame {}", index + 1), err)),
        }
    }
    Ok(samples)
}

fn with_newline(frame: &str) -> RawFrame {
    let mut line = frame.to_string();
    if !line.ends_with('\n') {
        line.push('\n');
    }
    RawFrame::new(line)
}

fn read_lines(path: &std::path::Path) -> CliResult<Vec<RawFrame>> {
    let context = format!("failed reading {}", path.display());
    let file = File::open(path).map_err(|err| io_error(&context, err))?;
    let mut reader = LineReader::new(BufReader::new(file));

    let mut lines = Vec::new();
    while let Some(line) = reader.read_line().map_err(|err| io_error(&context, err))? {
        lines.push(RawFrame::new(line));
    }
    Ok(lines)
}
