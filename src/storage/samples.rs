//! Labeled raw-sample recordings (append-only CSV).

use crate::error::{Error, Result};
use crate::source::{parse_record, SampleRecord, SampleSource};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub const CSV_COLUMNS: [&str; 4] = ["ts_unix", "ms_arduino", "adc", "label"];
pub const CSV_HEADER: &str = "ts_unix,ms_arduino,adc,label";

/// Label of recordings taken from the enrolled user.
pub const LABEL_SELF: u8 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordingStats {
    pub lines: u64,
    pub recorded: u64,
    pub malformed: u64,
}

/// Appends `ts_unix,ms_arduino,adc,label` rows; writes the header only when
/// the file is new or empty.
pub struct SampleRecorder {
    out: csv::Writer<File>,
    label: u8,
    rows: u64,
}

impl SampleRecorder {
    pub fn open(path: &Path, label: u8) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;
        let mut out = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        if is_new {
            out.write_record(CSV_COLUMNS)?;
        }
        info!(path = %path.display(), label, is_new, "recording samples");
        Ok(Self { out, label, rows: 0 })
    }

    /// Append a row stamped with the host wall clock.
    pub fn record(&mut self, record: &SampleRecord) -> Result<()> {
        let ts_unix = Utc::now().timestamp_micros() as f64 / 1e6;
        self.record_at(ts_unix, record)
    }

    /// Append a row with an explicit timestamp. An unparsed board timestamp
    /// is written as an empty field.
    pub fn record_at(&mut self, ts_unix: f64, record: &SampleRecord) -> Result<()> {
        let ms = record.ms.map(|ms| ms.to_string()).unwrap_or_default();
        self.out.write_record([
            format!("{ts_unix:.6}"),
            ms,
            record.adc.to_string(),
            self.label.to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Copy every valid protocol line from `source` until it ends or `stop`
    /// is set. Read timeouts only re-check `stop`.
    pub fn record_stream<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
        stop: &AtomicBool,
    ) -> Result<RecordingStats> {
        let mut stats = RecordingStats::default();
        while !stop.load(Ordering::Relaxed) {
            let line = match source.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.is_timeout() => continue,
                Err(e) => return Err(e),
            };
            stats.lines += 1;
            match parse_record(&line) {
                Ok(record) => {
                    self.record(&record)?;
                    stats.recorded += 1;
                }
                Err(e) => {
                    stats.malformed += 1;
                    debug!(error = %e, "record dropped");
                }
            }
        }
        self.flush()?;
        Ok(stats)
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Read the `adc` column of a recording, in file order. Columns are found by
/// header name; quoted fields and extra columns are fine. Rows whose `adc`
/// doesn't parse, or that aren't valid CSV, are skipped. With `label`, only
/// rows carrying that label are kept.
pub fn read_samples(path: &Path, label: Option<u8>) -> Result<Vec<f32>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(File::open(path)?);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::Configuration(format!("{} is empty", path.display())));
    }
    let column = |name: &str| {
        headers.iter().position(|c| c == name).ok_or_else(|| {
            Error::Configuration(format!("{} has no '{name}' column", path.display()))
        })
    };
    let adc_col = column("adc")?;
    let label_col = match label {
        Some(_) => Some(column("label")?),
        None => None,
    };

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "row skipped");
                continue;
            }
        };
        if let (Some(want), Some(col)) = (label, label_col) {
            if row.get(col).and_then(|f| f.parse::<u8>().ok()) != Some(want) {
                continue;
            }
        }
        match row.get(adc_col).and_then(|f| f.parse::<f32>().ok()) {
            Some(v) if v.is_finite() => samples.push(v),
            _ => skipped += 1,
        }
    }
    info!(path = %path.display(), samples = samples.len(), skipped, "recording loaded");
    Ok(samples)
}
