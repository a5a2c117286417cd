//! Date x (machine, shift) pivot over uploaded day summaries.

use std::collections::{BTreeSet, HashMap};
use std::ops::AddAssign;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use shift_core::formatting::minutes_per_part;
use shift_core::models::{DaySummary, ShiftKey};

// ── PivotCell ─────────────────────────────────────────────────────────────────

/// Parts and whole minutes for one `(machine, shift)` on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotCell {
    pub parts: u64,
    pub minutes: u64,
}

impl PivotCell {
    pub fn new(parts: u64, minutes: u64) -> Self {
        Self { parts, minutes }
    }

    /// Minutes per part rounded to two places; `0.0` for an empty cell.
    pub fn minutes_per_part(&self) -> f64 {
        minutes_per_part(self.minutes, self.parts)
    }
}

impl AddAssign for PivotCell {
    fn add_assign(&mut self, other: Self) {
        self.parts += other.parts;
        self.minutes += other.minutes;
    }
}

impl Serialize for PivotCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PivotCell", 3)?;
        state.serialize_field("parts", &self.parts)?;
        state.serialize_field("minutes", &self.minutes)?;
        state.serialize_field("minutes_per_part", &self.minutes_per_part())?;
        state.end()
    }
}

// ── PivotTable ────────────────────────────────────────────────────────────────

/// One `(machine, shift)` row of the pivot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PivotRow {
    pub key: ShiftKey,
    /// One cell per entry of [`PivotTable::dates`].
    pub cells: Vec<PivotCell>,
    pub total: PivotCell,
}

/// Read-only pivot of day summaries with row, column and grand totals.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PivotTable {
    /// Distinct dates, ascending.
    pub dates: Vec<String>,
    /// Rows in order of first appearance of their key.
    pub rows: Vec<PivotRow>,
    /// One total per date.
    pub column_totals: Vec<PivotCell>,
    pub grand_total: PivotCell,
}

impl PivotTable {
    /// Cell for `key` on `date`, if both exist in the table.
    pub fn cell(&self, key: ShiftKey, date: &str) -> Option<PivotCell> {
        let col = self.dates.iter().position(|d| d == date)?;
        let row = self.rows.iter().find(|r| r.key == key)?;
        row.cells.get(col).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ── PivotAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that reshapes day summaries into a [`PivotTable`].
pub struct PivotAggregator;

impl PivotAggregator {
    /// Pivot `summaries` into a date x (machine, shift) matrix.
    ///
    /// Minutes are floored per counter before any summation. Summaries that
    /// share a date merge additively into the same column. A key missing
    /// from some day contributes an empty cell for that date.
    pub fn build(summaries: &[DaySummary]) -> PivotTable {
        let dates: Vec<String> = summaries
            .iter()
            .map(|s| s.date.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let date_index: HashMap<&str, usize> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| (d.as_str(), i))
            .collect();

        let mut rows: Vec<PivotRow> = Vec::new();
        let mut row_index: HashMap<ShiftKey, usize> = HashMap::new();

        for summary in summaries {
            let col = date_index[summary.date.as_str()];
            for counter in summary.counters() {
                let key = counter.key();
                let idx = *row_index.entry(key).or_insert_with(|| {
                    rows.push(PivotRow {
                        key,
                        cells: vec![PivotCell::default(); dates.len()],
                        total: PivotCell::default(),
                    });
                    rows.len() - 1
                });
                let cell = PivotCell::new(counter.total_parts, counter.total_minutes());
                rows[idx].cells[col] += cell;
            }
        }

        let mut column_totals = vec![PivotCell::default(); dates.len()];
        let mut grand_total = PivotCell::default();
        for row in &mut rows {
            for (col, cell) in row.cells.iter().enumerate() {
                row.total += *cell;
                column_totals[col] += *cell;
            }
            grand_total += row.total;
        }

        PivotTable {
            dates,
            rows,
            column_totals,
            grand_total,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
