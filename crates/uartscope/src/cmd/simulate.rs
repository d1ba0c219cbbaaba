use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::info;
use uartscope_frame::{FrameWriter, CHANNEL_COUNT, MAX_VALUE};
use uartscope_transport::{ByteSource, SerialConfig, SerialPortSource};

use crate::cmd::{parse_duration, running_flag, SimulateArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: SimulateArgs, _format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let fixed = match &args.values {
        Some(values) => Some(fixed_values(values)?),
        None => None,
    };
    let running = running_flag()?;

    let emitted = match &args.port {
        Some(port) => {
            let mut config = SerialConfig::new(port.clone());
            if let Some(baud) = args.baud {
                config.baud_rate = baud;
            }
            let mut source = SerialPortSource::new();
            source
                .open(&config)
                .map_err(|err| transport_error("open failed", err))?;
            let result = emit(
                FrameWriter::new(SourceWriter(&mut source)),
                args.count,
                interval,
                fixed,
                || running.load(Ordering::SeqCst),
            );
            source.close();
            result?
        }
        None => emit(
            FrameWriter::new(io::stdout().lock()),
            args.count,
            interval,
            fixed,
            || running.load(Ordering::SeqCst),
        )?,
    };

    info!(frames = emitted, "simulation finished");
    Ok(SUCCESS)
}

fn emit<W: Write>(
    mut writer: FrameWriter<W>,
    count: u64,
    interval: Duration,
    fixed: Option<[u16; CHANNEL_COUNT]>,
    running: impl Fn() -> bool,
) -> CliResult<u64> {
    let mut n = 0u64;
    while running() && (count == 0 || n < count) {
        let values = fixed.unwrap_or_else(|| ramp(n));
        writer
            .send(&values)
            .map_err(|err| frame_error("write failed", err))?;
        n += 1;
        if count == 0 || n < count {
            std::thread::sleep(interval);
        }
    }
    Ok(writer.frames_written())
}

/// Six staggered sawtooth channels.
fn ramp(n: u64) -> [u16; CHANNEL_COUNT] {
    let period = u64::from(MAX_VALUE) + 1;
    std::array::from_fn(|channel| ((n + channel as u64 * 150) % period) as u16)
}

fn fixed_values(values: &[u16]) -> CliResult<[u16; CHANNEL_COUNT]> {
    let values: [u16; CHANNEL_COUNT] = values.try_into().map_err(|_| {
        CliError::new(
            USAGE,
            format!("--values needs {CHANNEL_COUNT} values, got {}", values.len()),
        )
    })?;
    if let Some(v) = values.iter().find(|&&v| v > MAX_VALUE) {
        return Err(CliError::new(
            USAGE,
            format!("--values entry {v} exceeds {MAX_VALUE}"),
        ));
    }
    Ok(values)
}

/// Adapts an open [`ByteSource`] to `io::Write`.
struct SourceWriter<'a, S>(&'a mut S);

impl<S: ByteSource> Write for SourceWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .write(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::BrokenPipe, err))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use uartscope_frame::{validate, RawFrame, FRAME_LEN};

    use super::*;

    #[test]
    fn emits_requested_number_of_valid_frames() {
        let mut out = Vec::new();
        let written = emit(
            FrameWriter::new(Cursor::new(&mut out)),
            3,
            Duration::from_millis(1),
            None,
            || true,
        )
        .expect("emit should succeed");

        assert_eq!(written, 3);
        assert_eq!(out.len(), 3 * FRAME_LEN);
        for line in out.chunks(FRAME_LEN) {
            validate(RawFrame::new(line.to_vec())).expect("simulated frame should validate");
        }
    }

    #[test]
    fn stops_when_no_longer_running() {
        let mut out = Vec::new();
        let written = emit(
            FrameWriter::new(Cursor::new(&mut out)),
            0,
            Duration::from_millis(1),
            Some([5; 6]),
            || false,
        )
        .expect("emit should succeed");
        assert_eq!(written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn ramp_stays_in_range() {
        assert_eq!(ramp(0), [0, 150, 300, 450, 600, 750]);
        assert!(ramp(999).iter().all(|&v| v <= MAX_VALUE));
    }

    #[test]
    fn fixed_values_need_six_in_range() {
        assert_eq!(fixed_values(&[1, 2, 3, 4, 5, 6]).unwrap(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(fixed_values(&[1, 2]).unwrap_err().code, USAGE);
        assert_eq!(fixed_values(&[1, 2, 3, 4, 5, 1000]).unwrap_err().code, USAGE);
    }
}
