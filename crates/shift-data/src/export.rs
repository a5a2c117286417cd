//! Per-day chart series and their CSV export.
//!
//! Each uploaded day becomes one row holding a value per `(machine, shift)`
//! label. Only labels with a nonzero value on some day become columns.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use shift_core::error::{ReportError, Result};
use shift_core::models::{DaySummary, ShiftKey};
use tracing::info;

/// Which counter field a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    Parts,
    /// Whole minutes, floored per counter.
    Minutes,
}

impl ChartMetric {
    /// File name the export is offered under when none is given.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ChartMetric::Parts => "cnc_summary.csv",
            ChartMetric::Minutes => "cnc_minutes_summary.csv",
        }
    }
}

/// One chart bar group: a date and its stacked values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub date: String,
    pub values: BTreeMap<ShiftKey, u64>,
}

/// Chart-ready view of the collected days.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub metric: ChartMetric,
    /// Labels with data, in canonical order.
    pub keys: Vec<ShiftKey>,
    /// One row per summary, in collection order.
    pub rows: Vec<ChartRow>,
}

impl ChartSeries {
    pub fn from_summaries(summaries: &[DaySummary], metric: ChartMetric) -> Self {
        let rows: Vec<ChartRow> = summaries
            .iter()
            .map(|summary| ChartRow {
                date: summary.date.clone(),
                values: summary
                    .counters()
                    .map(|c| {
                        let value = match metric {
                            ChartMetric::Parts => c.total_parts,
                            ChartMetric::Minutes => c.total_minutes(),
                        };
                        (c.key(), value)
                    })
                    .collect(),
            })
            .collect();

        let keys = ShiftKey::all()
            .filter(|key| {
                rows.iter()
                    .any(|row| row.values.get(key).is_some_and(|v| *v > 0))
            })
            .collect();

        Self { metric, keys, rows }
    }

    /// Write `date,<label>,...` followed by one line per row. Values absent
    /// from a row are written as empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> std::result::Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        let mut header = vec!["date".to_string()];
        header.extend(self.keys.iter().map(ShiftKey::label));
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.date.clone()];
            record.extend(self.keys.iter().map(|key| {
                row.values
                    .get(key)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            }));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the CSV to `path`, replacing any existing file.
    pub fn export(&self, path: &Path) -> Result<()> {
        let export_err = |message: String| ReportError::Export {
            path: path.to_path_buf(),
            message,
        };

        let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
        self.write_csv(file).map_err(|e| export_err(e.to_string()))?;

        info!(
            "Exported {} rows x {} columns to {}",
            self.rows.len(),
            self.keys.len(),
            path.display()
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
