//! Spreadsheet discovery and loading for the shift report.
//!
//! Reads the first worksheet of an `.xlsx`/`.xls`/`.ods` workbook (or a
//! `.csv` export) and converts every non-blank row into a [`RawRecord`].

use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use shift_core::error::{ReportError, Result};
use shift_core::models::{RawRecord, StartDate};
use tracing::{debug, warn};

/// Header of the column encoding machine number and shift.
pub const USER_COLUMN: &str = "User";
/// Header of the per-part machining duration column.
pub const SECONDS_COLUMN: &str = "Seconds";
/// Header of the optional shift start timestamp column.
pub const START_DATE_COLUMN: &str = "Start date";

/// Workbook formats opened through calamine.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Lower-cased extension of `path`, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Whether `path` carries an extension this reader understands.
pub fn is_supported(path: &Path) -> bool {
    let ext = extension_of(path);
    ext == "csv" || WORKBOOK_EXTENSIONS.contains(&ext.as_str())
}

/// Expand command-line inputs into the list of files to ingest.
///
/// Files are kept as given, in order. Directories are walked recursively
/// and contribute their supported files, sorted by path.
pub fn find_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();

        if found.is_empty() {
            warn!("No spreadsheet files found in {}", input.display());
        }
        files.extend(found);
    }

    files
}

/// Load every non-blank row of `path` as a [`RawRecord`].
///
/// The format is chosen by extension. A sheet without a `User` header is
/// rejected; `Seconds` and `Start date` are optional.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = extension_of(path);
    if !is_supported(path) {
        return Err(ReportError::UnsupportedFormat(ext));
    }

    let file = File::open(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = if ext == "csv" {
        read_csv_records(file, path)?
    } else {
        // calamine opens the path itself.
        drop(file);
        read_workbook_records(path)?
    };

    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

// ── Column mapping ────────────────────────────────────────────────────────────

/// Positions of the report's columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    user: usize,
    seconds: Option<usize>,
    start_date: Option<usize>,
}

impl ColumnMap {
    /// Locate the columns by trimmed, case-insensitive header name.
    fn from_headers<S: AsRef<str>>(headers: &[S], path: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
        };

        let user = find(USER_COLUMN).ok_or_else(|| ReportError::MissingColumn {
            path: path.to_path_buf(),
            column: USER_COLUMN.to_string(),
        })?;

        let map = Self {
            user,
            seconds: find(SECONDS_COLUMN),
            start_date: find(START_DATE_COLUMN),
        };
        if map.seconds.is_none() {
            warn!(
                "{}: no \"{}\" column, durations count as zero",
                path.display(),
                SECONDS_COLUMN
            );
        }
        Ok(map)
    }
}

// ── Workbooks ─────────────────────────────────────────────────────────────────

fn read_workbook_records(path: &Path) -> Result<Vec<RawRecord>> {
    let workbook_err = |message: String| ReportError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::NoWorksheet(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| workbook_err(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        // A sheet with no rows at all is an empty upload, not a broken one.
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    let columns = ColumnMap::from_headers(&headers, path)?;

    Ok(rows
        .filter(|row| !row.iter().all(is_blank_cell))
        .map(|row| record_from_cells(row, &columns))
        .collect())
}

fn is_blank_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn record_from_cells(row: &[Data], columns: &ColumnMap) -> RawRecord {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

    RawRecord {
        user: cell(Some(columns.user)).and_then(cell_text),
        seconds: cell(columns.seconds).and_then(cell_number),
        start_date: cell(columns.start_date).and_then(cell_start_date),
    }
}

/// Text content of a cell; numbers are rendered as calamine displays them.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}

/// Numeric content of a cell. Text is accepted when it parses as a number.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    }
}

fn cell_start_date(cell: &Data) -> Option<StartDate> {
    match cell {
        Data::Float(f) => Some(StartDate::Serial(*f)),
        Data::Int(i) => Some(StartDate::Serial(*i as f64)),
        Data::DateTime(dt) => Some(StartDate::Serial(dt.as_f64())),
        // ODS date cells arrive as ISO 8601 text.
        Data::String(s) | Data::DateTimeIso(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| StartDate::Text(trimmed.to_string()))
        }
        _ => None,
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

fn read_csv_records(file: File, path: &Path) -> Result<Vec<RawRecord>> {
    let csv_err = |e: csv::Error| ReportError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Vec::new());
    }
    let columns = ColumnMap::from_headers(&headers, path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|value| !value.is_empty())
        };

        records.push(RawRecord {
            user: field(Some(columns.user)).map(str::to_string),
            seconds: field(columns.seconds).and_then(|v| v.parse::<f64>().ok()),
            start_date: field(columns.start_date).map(|v| match v.parse::<f64>() {
                Ok(serial) => StartDate::Serial(serial),
                Err(_) => StartDate::Text(v.to_string()),
            }),
        });
    }

    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
