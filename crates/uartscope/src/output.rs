use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use uartscope_frame::{Channel, Sample};
use uartscope_pipeline::{format_record, PipelineStats};
use uartscope_transport::PortInfo;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }

    /// Whether output is meant for a person rather than a program.
    pub fn is_human(self) -> bool {
        matches!(self, Self::Table | Self::Pretty)
    }
}

#[derive(Serialize)]
struct SampleOutput {
    timestamp: String,
    elapsed: f64,
    channels: [i32; 6],
    in_range: bool,
}

impl From<&Sample> for SampleOutput {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp(),
            elapsed: sample.elapsed(),
            channels: sample.channels(),
            in_range: sample.in_range(),
        }
    }
}

pub fn print_sample(sample: &Sample, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SampleOutput::from(sample)),
        OutputFormat::Table => {
            let mut table = new_table(sample_header());
            table.add_row(sample_row(sample));
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", pretty_sample(sample)),
        OutputFormat::Raw => print_raw(format_record(sample).as_bytes()),
    }
}

/// Print several samples, as one table when the format is tabular.
pub fn print_samples(samples: &[Sample], format: OutputFormat) {
    if format != OutputFormat::Table {
        for sample in samples {
            print_sample(sample, format);
        }
        return;
    }
    let mut table = new_table(sample_header());
    for sample in samples {
        table.add_row(sample_row(sample));
    }
    println!("{table}");
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    manufacturer: Option<&'a str>,
    product: Option<&'a str>,
    serial_number: Option<&'a str>,
    vid: Option<String>,
    pid: Option<String>,
}

impl<'a> From<&'a PortInfo> for PortOutput<'a> {
    fn from(port: &'a PortInfo) -> Self {
        Self {
            name: &port.name,
            kind: port.kind,
            manufacturer: port.manufacturer.as_deref(),
            product: port.product.as_deref(),
            serial_number: port.serial_number.as_deref(),
            vid: port.vid_pid.map(|(vid, _)| format!("{vid:04x}")),
            pid: port.vid_pid.map(|(_, pid)| format!("{pid:04x}")),
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports.iter().map(PortOutput::from).collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "TYPE", "DESCRIPTION", "VID:PID"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.to_string(),
                    describe(port),
                    port.vid_pid
                        .map(|(vid, pid)| format!("{vid:04x}:{pid:04x}"))
                        .unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in ports {
                println!("{} ({}) {}", port.name, port.kind, describe(port));
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    source: &'a str,
    log_path: Option<String>,
    #[serde(flatten)]
    stats: PipelineStats,
}

/// Totals printed when a run or replay ends.
pub fn print_summary(
    source: &str,
    log_path: Option<&Path>,
    stats: PipelineStats,
    format: OutputFormat,
) {
    let log_path = log_path.map(|p| p.display().to_string());
    match format {
        OutputFormat::Json => print_json(&SummaryOutput {
            source,
            log_path,
            stats,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table
                .add_row(vec!["source".to_string(), source.to_string()])
                .add_row(vec![
                    "log".to_string(),
                    log_path.unwrap_or_else(|| "-".to_string()),
                ])
                .add_row(vec!["decoded".to_string(), stats.decoded.to_string()])
                .add_row(vec!["invalid".to_string(), stats.invalid.to_string()])
                .add_row(vec!["plotted".to_string(), stats.forwarded.to_string()])
                .add_row(vec!["persisted".to_string(), stats.persisted.to_string()]);
            if stats.persist_failures > 0 {
                table.add_row(vec![
                    "persist failures".to_string(),
                    stats.persist_failures.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "{source}: decoded={} invalid={} plotted={} persisted={}",
            stats.decoded, stats.invalid, stats.forwarded, stats.persisted
        ),
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn sample_header() -> Vec<&'static str> {
    let mut header = vec!["TIME"];
    header.extend(Channel::ALL.iter().map(|c| c.name()));
    header
}

fn sample_row(sample: &Sample) -> Vec<String> {
    let mut row = vec![sample.timestamp()];
    row.extend(sample.channels().iter().map(i32::to_string));
    row
}

fn pretty_sample(sample: &Sample) -> String {
    let fields: Vec<String> = Channel::ALL
        .iter()
        .map(|&c| format!("{}={}", char::from(c.marker()), sample.value(c)))
        .collect();
    format!("{} {}", sample.timestamp(), fields.join(" "))
}

fn describe(port: &PortInfo) -> String {
    [port.manufacturer.as_deref(), port.product.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use uartscope_frame::{frame_bytes, validate, FrameDecoder, MonotonicClock, RawFrame};

    use super::*;

    fn sample() -> Sample {
        let frame = validate(RawFrame::new(
            frame_bytes(&[1, 20, 300, 4, 50, 999]).expect("values should encode"),
        ))
        .expect("frame should validate");
        FrameDecoder::new(MonotonicClock::start()).decode(frame)
    }

    #[test]
    fn pretty_lists_channels_by_marker() {
        let text = pretty_sample(&sample());
        assert!(text.ends_with(" a=1 b=20 c=300 d=4 e=50 f=999"));
    }

    #[test]
    fn json_carries_channel_array() {
        let json = serde_json::to_value(SampleOutput::from(&sample())).expect("should serialize");
        assert_eq!(json["channels"], serde_json::json!([1, 20, 300, 4, 50, 999]));
        assert_eq!(json["in_range"], true);
    }

    #[test]
    fn sample_header_names_every_channel() {
        assert_eq!(sample_header().len(), 7);
    }

    #[test]
    fn port_description_skips_missing_fields() {
        let port = PortInfo {
            name: "/dev/ttyUSB0".to_string(),
            kind: "usb",
            manufacturer: None,
            product: Some("CP2102".to_string()),
            serial_number: None,
            vid_pid: Some((0x10c4, 0xea60)),
        };
        assert_eq!(describe(&port), "CP2102");
        let out = PortOutput::from(&port);
        assert_eq!(out.vid.as_deref(), Some("10c4"));
    }
}
