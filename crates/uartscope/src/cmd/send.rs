use std::time::Duration;

use comfy_table::Table;
use serde::Serialize;
use uartscope_transport::{ByteSource, SerialPortSource};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_raw, OutputFormat};

/// Reply bytes read back after a write.
pub const MAX_REPLY: usize = 6;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.serial.resolve()?.serial;
    if config.port_name.is_empty() {
        return Err(CliError::new(
            USAGE,
            "no port given (use --port or a config file)",
        ));
    }
    let wait = parse_duration(&args.wait)?;

    let mut payload = args.data.into_bytes();
    if args.newline {
        payload.push(b'\n');
    }

    let mut source = SerialPortSource::new();
    source
        .open(&config)
        .map_err(|err| transport_error("open failed", err))?;
    let reply = exchange(&mut source, &payload, wait);
    source.close();
    let reply = reply.map_err(|err| transport_error("send failed", err))?;

    if config.local_echo && format.is_human() {
        println!("> {}", String::from_utf8_lossy(&payload).trim_end());
    }
    print_reply(payload.len(), &reply, format);
    Ok(SUCCESS)
}

/// Write `payload`, wait up to `wait` for the device, then read back at most
/// [`MAX_REPLY`] bytes.
fn exchange<S: ByteSource>(
    source: &mut S,
    payload: &[u8],
    wait: Duration,
) -> uartscope_transport::Result<Vec<u8>> {
    source.write(payload)?;
    if !source.wait_for_ready(wait)? {
        return Ok(Vec::new());
    }
    Ok(source.read_available(MAX_REPLY)?.to_vec())
}

#[derive(Serialize)]
struct SendOutput {
    sent: usize,
    reply: String,
    reply_len: usize,
}

fn print_reply(sent: usize, reply: &[u8], format: OutputFormat) {
    let text = String::from_utf8_lossy(reply).into_owned();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&SendOutput {
                sent,
                reply_len: reply.len(),
                reply: text,
            })
            .unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .set_header(vec!["SENT", "REPLY"])
                .add_row(vec![sent.to_string(), text]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("< {}", text.trim_end()),
        OutputFormat::Raw => print_raw(reply),
    }
}
