//! Fire Record Extractor Module
//! Reads fire-detection CSV files into ordered records, dropping rows that do not parse.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default cap on the number of data rows considered in one pass.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Expected date layout of the date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const LAT_COL: usize = 0;
const LON_COL: usize = 1;
const BRIGHT_COL: usize = 2;
const DATE_COL: usize = 5;

/// File-level failures. These abort the extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Row-level failures. The row is dropped and extraction continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing column {column} (row has {found} columns)")]
    MissingColumn { column: usize, found: usize },
    #[error("column {column}: could not convert '{value}' to a number")]
    InvalidNumber { column: usize, value: String },
    #[error("column {column}: '{value}' does not match YYYY-MM-DD")]
    InvalidDate { column: usize, value: String },
}

/// A single validated fire detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub brightness: f64,
    pub date: NaiveDate,
}

/// Why a given source line was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
    pub reason: RowError,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<FireRecord>,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Data rows looked at, parsed or not. Never exceeds the row cap.
    pub rows_considered: usize,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split records into parallel (lats, lons, brights, dates) sequences.
    pub fn columns(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<NaiveDate>) {
        let n = self.records.len();
        let mut lats = Vec::with_capacity(n);
        let mut lons = Vec::with_capacity(n);
        let mut brights = Vec::with_capacity(n);
        let mut dates = Vec::with_capacity(n);

        for r in &self.records {
            lats.push(r.latitude);
            lons.push(r.longitude);
            brights.push(r.brightness);
            dates.push(r.date);
        }

        (lats, lons, brights, dates)
    }
}

/// Extracts fire records from a CSV file.
///
/// Holds only the source path; every call to [`DataExtractor::extract`] builds
/// fresh collections, so one extractor can be reused safely.
pub struct DataExtractor {
    file_path: PathBuf,
}

impl DataExtractor {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Extract at most `max_rows` data rows from the file.
    pub fn extract(&self, max_rows: usize) -> Result<Extraction, ExtractError> {
        extract(&self.file_path, max_rows)
    }
}

/// Read `path` and convert up to `max_rows` data rows into [`FireRecord`]s.
///
/// The first row is treated as a header. Rows that fail to parse are dropped,
/// recorded in [`Extraction::diagnostics`], and still count toward `max_rows`.
pub fn extract(path: impl AsRef<Path>, max_rows: usize) -> Result<Extraction, ExtractError> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let extraction = parse_records(&text, max_rows);

    info!(
        path = %path.display(),
        records = extraction.records.len(),
        skipped = extraction.diagnostics.len(),
        rows_considered = extraction.rows_considered,
        "extracted fire records"
    );
    Ok(extraction)
}

fn read_source(path: &Path) -> Result<String, ExtractError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ExtractError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ExtractError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parse CSV text already held in memory.
///
/// Line 1 is the header, whatever it contains. Every later line, blank or not,
/// is one data row and takes one slot of `max_rows`.
pub fn parse_records(text: &str, max_rows: usize) -> Extraction {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true);

    let mut extraction = Extraction::default();

    for (idx, row) in text.lines().skip(1).take(max_rows).enumerate() {
        extraction.rows_considered += 1;
        let line = idx as u64 + 2;

        // a blank line yields no record and is parsed as a row with zero columns
        let record = builder
            .from_reader(row.as_bytes())
            .records()
            .next()
            .and_then(Result::ok)
            .unwrap_or_default();

        match parse_row(&record) {
            Ok(record) => extraction.records.push(record),
            Err(reason) => {
                warn!(line, %reason, "skipping row");
                extraction.diagnostics.push(RowDiagnostic { line, reason });
            }
        }
    }

    debug!(rows = extraction.rows_considered, max_rows, "csv scan complete");
    extraction
}

/// Convert one CSV record. All four fields must parse or the row is rejected.
pub fn parse_row(record: &StringRecord) -> Result<FireRecord, RowError> {
    Ok(FireRecord {
        latitude: parse_number(record, LAT_COL)?,
        longitude: parse_number(record, LON_COL)?,
        brightness: parse_number(record, BRIGHT_COL)?,
        date: parse_date(record, DATE_COL)?,
    })
}

fn field(record: &StringRecord, column: usize) -> Result<&str, RowError> {
    record.get(column).ok_or(RowError::MissingColumn {
        column,
        found: record.len(),
    })
}

fn parse_number(record: &StringRecord, column: usize) -> Result<f64, RowError> {
    let value = field(record, column)?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| RowError::InvalidNumber {
            column,
            value: value.to_string(),
        })
}

fn parse_date(record: &StringRecord, column: usize) -> Result<NaiveDate, RowError> {
    let value = field(record, column)?;
    let invalid = || RowError::InvalidDate {
        column,
        value: value.to_string(),
    };

    // chrono skips leading whitespace before numeric fields; dates must be exact
    if value.trim() != value {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}
