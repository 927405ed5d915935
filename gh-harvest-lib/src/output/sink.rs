//! Append-only CSV output shared by all workers.

use crate::Result;
use crate::fetch::{FetchOutcome, FlatRow, HEADERS, OutcomeSink};
use camino::Utf8Path;
use csv::WriterBuilder;
use ohno::{IntoAppError, app_err};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

/// Writes row blocks to the CSV output and failures to the error log.
///
/// Each identifier's rows are encoded up front and written with a single call while the
/// output lock is held, so blocks from concurrent workers never interleave.
#[derive(Debug)]
pub struct CsvSink<W, E> {
    rows: Mutex<W>,
    errors: Mutex<E>,
}

impl CsvSink<File, File> {
    /// Create (truncating) the CSV output with its header row, and open the error log for appending.
    pub fn create(output: &Utf8Path, error_log: &Utf8Path) -> Result<Self> {
        let rows = File::create(output).into_app_err_with(|| format!("unable to create output file '{output}'"))?;
        let errors = OpenOptions::new()
            .create(true)
            .append(true)
            .open(error_log)
            .into_app_err_with(|| format!("unable to open error log '{error_log}'"))?;

        Self::new(rows, errors)
    }
}

impl<W: Write + Send, E: Write + Send> CsvSink<W, E> {
    /// Wrap the given writers, emitting the header row to `rows` first.
    pub fn new(mut rows: W, errors: E) -> Result<Self> {
        let header = encode_records(core::iter::once(HEADERS))?;
        rows.write_all(&header).into_app_err("unable to write CSV header")?;
        rows.flush().into_app_err("unable to write CSV header")?;

        Ok(Self {
            rows: Mutex::new(rows),
            errors: Mutex::new(errors),
        })
    }

    /// Append one identifier's rows as a contiguous block.
    pub fn write_rows(&self, identifier: &str, rows: &[FlatRow]) -> Result<()> {
        let block = encode_records(rows.iter().map(FlatRow::record))?;

        let mut out = self.rows.lock().map_err(|e| app_err!("output lock poisoned: {e}"))?;
        out.write_all(&block)
            .and_then(|()| out.flush())
            .into_app_err_with(|| format!("unable to write rows for '{identifier}'"))
    }

    /// Append a single `identifier: reason` line to the error log.
    pub fn write_failure(&self, identifier: &str, reason: &str) -> Result<()> {
        let line = format!("{identifier}: {}\n", single_line(reason));

        let mut log = self.errors.lock().map_err(|e| app_err!("error log lock poisoned: {e}"))?;
        log.write_all(line.as_bytes())
            .and_then(|()| log.flush())
            .into_app_err_with(|| format!("unable to log failure for '{identifier}'"))
    }

    /// Consume the sink and return the underlying writers.
    pub fn into_inner(self) -> Result<(W, E)> {
        let rows = self.rows.into_inner().map_err(|e| app_err!("output lock poisoned: {e}"))?;
        let errors = self.errors.into_inner().map_err(|e| app_err!("error log lock poisoned: {e}"))?;
        Ok((rows, errors))
    }
}

impl<W: Write + Send, E: Write + Send> OutcomeSink for CsvSink<W, E> {
    fn record(&self, outcome: FetchOutcome) -> Result<()> {
        match outcome {
            FetchOutcome::Rows { identifier, rows } => self.write_rows(&identifier, &rows),
            FetchOutcome::Failure { identifier, reason } => self.write_failure(&identifier, &reason),
        }
    }
}

/// CSV-encode records into an in-memory buffer.
fn encode_records<'a>(records: impl IntoIterator<Item = [&'a str; 34]>) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    for record in records {
        writer.write_record(record).into_app_err("unable to encode CSV record")?;
    }

    writer
        .into_inner()
        .map_err(|e| app_err!("unable to encode CSV records: {}", e.error()))
}

/// Fold line breaks so a reason always occupies one line of the error log.
fn single_line(reason: &str) -> String {
    reason.split(['\r', '\n']).filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}
