use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uartscope_frame::Sample;

use crate::sink::PersistenceSink;

/// Where samples are logged unless told otherwise.
pub const DEFAULT_LOG_PATH: &str = "data/data.csv";

/// Field separator in log records.
pub const SEPARATOR: char = ';';

/// Appends one `;`-separated text record per sample to a file.
///
/// Record layout: `HH:MM:SS.mmm;A;B;C;D;E;F;` followed by `\n`. The file and
/// its parent directory are created on the first append, and again whenever
/// the file has disappeared since it was opened. Each record is flushed as
/// soon as it is written, so a crash loses at most the sample being written.
pub struct CsvLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records: u64,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            records: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written by this log since it was created.
    pub fn records(&self) -> u64 {
        self.records
    }

    fn writer(&mut self) -> std::io::Result<&mut BufWriter<File>> {
        if self.writer.is_some() && !self.path.exists() {
            debug!(path = ?self.path, "sample log removed, reopening");
            self.writer = None;
        }
        if self.writer.is_none() {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            debug!(path = ?self.path, "opened sample log");
            self.writer = Some(BufWriter::new(file));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("sample log not open"))
    }
}

impl Default for CsvLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH)
    }
}

impl PersistenceSink for CsvLog {
    fn record(&mut self, sample: &Sample) -> std::io::Result<()> {
        let record = format_record(sample);
        let writer = self.writer()?;
        writer.write_all(record.as_bytes())?;
        writer.flush()?;
        self.records += 1;
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

/// Render `sample` as one log record, line terminator included.
pub fn format_record(sample: &Sample) -> String {
    let mut record = sample.timestamp();
    record.push(SEPARATOR);
    for value in sample.channels() {
        record.push_str(&value.to_string());
        record.push(SEPARATOR);
    }
    record.push('\n');
    record
}
