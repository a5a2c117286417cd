//! In-memory collection of day summaries and per-file ingestion.
//!
//! Every file is read and extracted on its own; a failure is recorded in the
//! [`IngestReport`] and never touches the summaries already collected.

use std::path::{Path, PathBuf};

use shift_core::error::Result;
use shift_core::models::DaySummary;
use tracing::{info, warn};

use crate::aggregator::{PivotAggregator, PivotTable};
use crate::extractor::{extract_day, Extraction, SkippedRow};
use crate::reader::read_records;

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of ingesting one file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    /// A summary was appended; `skipped` lists rows left out of it.
    Loaded {
        date: String,
        parts: u64,
        skipped: Vec<SkippedRow>,
    },
    /// The file had no data rows; nothing was appended.
    Empty,
    /// The file could not be read.
    Failed { error: String },
}

/// Per-file outcomes of one ingestion run, in input order.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IngestReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl IngestReport {
    pub fn loaded_count(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Loaded { .. }))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Failed { error } => Some((path, error.as_str())),
            _ => None,
        })
    }

    pub fn skipped_rows(&self) -> usize {
        self.files
            .iter()
            .map(|(_, o)| match o {
                FileOutcome::Loaded { skipped, .. } => skipped.len(),
                _ => 0,
            })
            .sum()
    }
}

// ── Single file ───────────────────────────────────────────────────────────────

/// Read and extract one file without touching any shared state.
pub fn ingest_file(path: &Path) -> Result<Extraction> {
    let records = read_records(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(extract_day(&records, &file_name))
}

// ── DayCollection ─────────────────────────────────────────────────────────────

/// Append-only list of day summaries, always sorted by date.
#[derive(Debug, Clone, Default)]
pub struct DayCollection {
    summaries: Vec<DaySummary>,
}

impl DayCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a summary and restore ascending date order.
    ///
    /// The sort is stable, so summaries sharing a date keep arrival order.
    pub fn append(&mut self, summary: DaySummary) {
        self.summaries.push(summary);
        self.summaries.sort_by(|a, b| a.date.cmp(&b.date));
    }

    /// Ingest `paths` one by one, appending each successful summary.
    pub fn ingest<P: AsRef<Path>>(&mut self, paths: &[P]) -> IngestReport {
        let mut report = IngestReport::default();

        for path in paths {
            let path = path.as_ref();
            let outcome = match ingest_file(path) {
                Ok(Extraction {
                    summary: Some(summary),
                    skipped,
                }) => {
                    info!(
                        "Loaded {} ({}, {} parts)",
                        path.display(),
                        summary.date,
                        summary.total_parts()
                    );
                    let outcome = FileOutcome::Loaded {
                        date: summary.date.clone(),
                        parts: summary.total_parts(),
                        skipped,
                    };
                    self.append(summary);
                    outcome
                }
                Ok(Extraction { summary: None, .. }) => {
                    info!("{} has no rows, ignored", path.display());
                    FileOutcome::Empty
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {}", path.display(), e);
                    FileOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.files.push((path.to_path_buf(), outcome));
        }

        report
    }

    pub fn summaries(&self) -> &[DaySummary] {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Recompute the pivot over everything collected so far.
    pub fn pivot(&self) -> PivotTable {
        PivotAggregator::build(&self.summaries)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use shift_core::models::{Shift, ShiftKey};
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn test_append_keeps_dates_sorted() {
        let mut collection = DayCollection::new();
        collection.append(DaySummary::new("2025-01-28", "b"));
        collection.append(DaySummary::new("2024-12-13", "a"));
        collection.append(DaySummary::new("2025-01-27", "c"));

        let dates: Vec<&str> = collection.summaries().iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-12-13", "2025-01-27", "2025-01-28"]);
    }

    #[test]
    fn test_resort_is_idempotent() {
        let mut collection = DayCollection::new();
        for date in ["2025-01-02", "2025-01-01", "2025-01-02", "Unknown date"] {
            collection.append(DaySummary::new(date, date));
        }
        let before = collection.summaries().to_vec();

        let mut resorted = before.clone();
        resorted.sort_by(|a, b| a.date.cmp(&b.date));
        assert_eq!(before, resorted);
    }

    #[test]
    fn test_ingest_isolates_failures() {
        let tmp = TempDir::new().expect("tempdir");
        let good = write_csv(&tmp, "13.12.2024_shift.csv", "User,Seconds\nMachine2-Day,90\n");
        let bad = write_csv(&tmp, "14.12.2024_shift.csv", "Operator,Seconds\nBob,5\n");
        let empty = write_csv(&tmp, "15.12.2024_shift.csv", "User,Seconds\n");
        let later = write_csv(&tmp, "16.12.2024_shift.csv", "User,Seconds\nMachine1-Night,30\n");
        let missing = tmp.path().join("missing.xlsx");

        let mut collection = DayCollection::new();
        let report = collection.ingest(&[good, bad.clone(), empty, later, missing]);

        assert_eq!(collection.len(), 2);
        assert_eq!(report.files.len(), 5);
        assert_eq!(report.loaded_count(), 2);
        assert_eq!(report.files[2].1, FileOutcome::Empty);

        let failed: Vec<&PathBuf> = report.failed().map(|(p, _)| p).collect();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0], &bad);
    }

    #[test]
    fn test_ingest_reports_skipped_rows() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_csv(
            &tmp,
            "13.12.2024.csv",
            "User,Seconds\nMachine2-Day,90\nLunch break,0\nMachine7-Day,10\n",
        );

        let mut collection = DayCollection::new();
        let report = collection.ingest(&[path]);

        assert_eq!(report.skipped_rows(), 2);
        match &report.files[0].1 {
            FileOutcome::Loaded { date, parts, .. } => {
                assert_eq!(date, "2024-12-13");
                assert_eq!(*parts, 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_dates_merge_in_pivot() {
        let tmp = TempDir::new().expect("tempdir");
        let first = write_csv(
            &tmp,
            "27.01.2025_a.csv",
            "User,Seconds\nM1-Day,60\nM1-Day,60\nM1-Day,60\n",
        );
        let second = write_csv(
            &tmp,
            "27.01.2025_b.csv",
            "User,Seconds\nM1-Day,60\nM1-Day,60\nM1-Day,60\nM1-Day,60\nM1-Day,60\n",
        );

        let mut collection = DayCollection::new();
        collection.ingest(&[first, second]);
        let pivot = collection.pivot();

        let key = ShiftKey::new(1, Shift::Day).unwrap();
        assert_eq!(pivot.cell(key, "2025-01-27").unwrap().parts, 8);
        assert_eq!(pivot.dates, vec!["2025-01-27"]);
    }
}
