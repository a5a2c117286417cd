use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the CNC shift report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook container could not be decoded.
    #[error("Failed to parse workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A CSV export could not be decoded.
    #[error("Failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The workbook has no worksheet to read.
    #[error("No worksheet found in {0}")]
    NoWorksheet(PathBuf),

    /// A required header is absent from the first row.
    #[error("Missing column \"{column}\" in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// The file extension is not one of the supported spreadsheet formats.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The `User` field carries no machine number.
    #[error("Malformed user field: {0:?}")]
    MalformedUser(String),

    /// The machine number in the `User` field is not a known CNC.
    #[error("Machine id {0} is outside 1..=4")]
    MachineOutOfRange(u32),

    /// Writing a CSV export failed.
    #[error("Export failed for {path}: {message}")]
    Export { path: PathBuf, message: String },
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
