use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use uartscope_frame::ValidationMode;
use uartscope_pipeline::{PipelineConfig, DEFAULT_LOG_PATH};
use uartscope_transport::{DataBits, FlowControl, Parity, SerialConfig, StopBits};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Contents of a `--config` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub serial: SerialConfig,
    pub pipeline: PipelineConfig,
    pub log_path: PathBuf,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            pipeline: PipelineConfig::default(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl ScopeConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        serde_json::from_str(&text).map_err(|err| {
            CliError::new(
                DATA_INVALID,
                format!("invalid config {}: {err}", path.display()),
            )
        })
    }

    /// Defaults, overlaid with the config file when one is given.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Device settings shared by every command that opens a port.
///
/// Flags left unset keep the value from the config file (or the default).
#[derive(Args, Debug, Default, Clone)]
pub struct SerialArgs {
    /// Serial port name, e.g. /dev/ttyUSB0 or COM3.
    #[arg(long, short = 'p')]
    pub port: Option<String>,
    /// Baud rate.
    #[arg(long, short = 'b')]
    pub baud: Option<u32>,
    /// Data bits (5, 6, 7 or 8).
    #[arg(long)]
    pub data_bits: Option<DataBits>,
    /// Parity (none, even, odd).
    #[arg(long)]
    pub parity: Option<Parity>,
    /// Stop bits (1 or 2).
    #[arg(long)]
    pub stop_bits: Option<StopBits>,
    /// Flow control (none, hardware, software).
    #[arg(long)]
    pub flow_control: Option<FlowControl>,
    /// Do not echo sent bytes locally.
    #[arg(long)]
    pub no_local_echo: bool,
    /// JSON config file with `serial`, `pipeline` and `log_path` sections.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl SerialArgs {
    /// Load the config file (if any) and apply flag overrides to it.
    pub fn resolve(&self) -> CliResult<ScopeConfig> {
        let mut config = ScopeConfig::load_or_default(self.config.as_deref())?;
        self.apply(&mut config.serial);
        Ok(config)
    }

    pub fn apply(&self, serial: &mut SerialConfig) {
        if let Some(port) = &self.port {
            serial.port_name = port.clone();
        }
        if let Some(baud) = self.baud {
            serial.baud_rate = baud;
        }
        if let Some(bits) = self.data_bits {
            serial.data_bits = bits;
        }
        if let Some(parity) = self.parity {
            serial.parity = parity;
        }
        if let Some(bits) = self.stop_bits {
            serial.stop_bits = bits;
        }
        if let Some(flow) = self.flow_control {
            serial.flow_control = flow;
        }
        if self.no_local_echo {
            serial.local_echo = false;
        }
    }
}

/// Pipeline flags shared by `run` and `replay`.
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    /// Reject frames whose markers or digits are out of place.
    #[arg(long)]
    pub strict: bool,
    /// Sample log file.
    #[arg(long, value_name = "FILE")]
    pub log_path: Option<PathBuf>,
    /// Do not write the sample log.
    #[arg(long, conflicts_with = "log_path")]
    pub no_log: bool,
}

impl PipelineArgs {
    pub fn apply(&self, config: &mut ScopeConfig) {
        if self.strict {
            config.pipeline.validation = ValidationMode::Strict;
        }
        if let Some(path) = &self.log_path {
            config.log_path = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let path = dir.path().join("scope.json");
        std::fs::write(
            &path,
            r#"{
                "serial": { "port_name": "/dev/ttyACM0", "baud_rate": 57600, "parity": "even" },
                "pipeline": { "cadence_ms": 100 },
                "log_path": "captures/run.csv"
            }"#,
        )
        .expect("config should be writable");

        let args = SerialArgs {
            baud: Some(115_200),
            no_local_echo: true,
            config: Some(path),
            ..SerialArgs::default()
        };
        let config = args.resolve().expect("config should load");

        assert_eq!(config.serial.port_name, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.parity, Parity::Even);
        assert!(!config.serial.local_echo);
        assert_eq!(config.pipeline.cadence_ms, 100);
        assert_eq!(config.pipeline.frames_per_tick, 1);
        assert_eq!(config.log_path, PathBuf::from("captures/run.csv"));
    }

    #[test]
    fn malformed_file_is_data_invalid() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let path = dir.path().join("scope.json");
        std::fs::write(&path, "{ not json").expect("config should be writable");

        let err = ScopeConfig::load(&path).expect_err("bad json should fail");
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = ScopeConfig::load(Path::new("/nonexistent/scope.json"))
            .expect_err("missing file should fail");
        assert!(err.message.contains("/nonexistent/scope.json"));
    }

    #[test]
    fn strict_flag_switches_validation() {
        let mut config = ScopeConfig::default();
        PipelineArgs {
            strict: true,
            log_path: Some(PathBuf::from("out.csv")),
            no_log: false,
        }
        .apply(&mut config);
        assert_eq!(config.pipeline.validation, ValidationMode::Strict);
        assert_eq!(config.log_path, PathBuf::from("out.csv"));
    }
}
