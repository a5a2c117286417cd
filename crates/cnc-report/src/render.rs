//! Plain-text and JSON rendering of the collected days.

use serde::Serialize;
use shift_core::formatting::{format_cell, format_count, format_ratio};
use shift_core::models::{DaySummary, Shift};
use shift_data::aggregator::PivotTable;
use shift_data::collection::IngestReport;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

/// Everything a `--view json` run prints.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub files: &'a IngestReport,
    pub days: &'a [DaySummary],
    pub pivot: &'a PivotTable,
}

/// One nonzero counter in the per-day view.
#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "CNC")]
    machine: u8,
    #[tabled(rename = "Shift")]
    shift: Shift,
    #[tabled(rename = "Total Parts")]
    parts: String,
    #[tabled(rename = "Total Minutes")]
    minutes: String,
}

/// Plain layout shared by both views; numeric columns from `first_numeric`
/// on are right-aligned.
fn finish(table: &mut Table, first_numeric: usize) -> String {
    table
        .with(Style::psql())
        .modify(Columns::new(first_numeric..), Alignment::right());
    format!("{}\n", table)
}

/// Pivot view: one row per `(machine, shift)`, one `parts / minutes`
/// column per date, a totals column and a minutes-per-part column.
pub fn render_pivot(table: &PivotTable) -> String {
    if table.is_empty() {
        return "No production data.\n".to_string();
    }

    // Date columns vary per run, so rows are assembled through the builder.
    let mut builder = Builder::default();

    let mut header = vec!["CNC".to_string()];
    header.extend(table.dates.iter().cloned());
    header.push("Total".to_string());
    header.push("Min/Part".to_string());
    builder.push_record(header);

    for row in &table.rows {
        let mut cells = vec![row.key.label()];
        cells.extend(row.cells.iter().map(|c| format_cell(c.parts, c.minutes)));
        cells.push(format_cell(row.total.parts, row.total.minutes));
        cells.push(format_ratio(row.total.minutes_per_part()));
        builder.push_record(cells);
    }

    let mut totals = vec!["TOTAL".to_string()];
    totals.extend(
        table
            .column_totals
            .iter()
            .map(|c| format_cell(c.parts, c.minutes)),
    );
    totals.push(format_cell(table.grand_total.parts, table.grand_total.minutes));
    totals.push(format_ratio(table.grand_total.minutes_per_part()));
    builder.push_record(totals);

    finish(&mut builder.build(), 1)
}

/// Per-day view: one table per uploaded file listing the counters that
/// produced at least one part.
pub fn render_days(summaries: &[DaySummary]) -> String {
    if summaries.is_empty() {
        return "No production data.\n".to_string();
    }

    summaries
        .iter()
        .map(|summary| {
            let rows: Vec<CounterRow> = summary
                .counters()
                .filter(|c| c.total_parts > 0)
                .map(|c| CounterRow {
                    machine: c.machine_id,
                    shift: c.shift,
                    parts: format_count(c.total_parts),
                    minutes: format_count(c.total_minutes()),
                })
                .collect();

            let body = if rows.is_empty() {
                "(no parts recorded)\n".to_string()
            } else {
                finish(&mut Table::new(rows), 2)
            };
            format!("{} ({})\n{}", summary.date, summary.source, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
