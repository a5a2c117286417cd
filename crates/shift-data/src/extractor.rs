//! Turns the rows of one uploaded export into a [`DaySummary`].

use std::sync::OnceLock;

use regex::Regex;
use shift_core::error::{ReportError, Result};
use shift_core::models::{DaySummary, RawRecord, Shift, ShiftKey};
use shift_core::time_utils::resolve_day_date;
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// A row left out of the summary, with the reason.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SkippedRow {
    /// 1-based data row number (the header row is not counted).
    pub row: usize,
    pub reason: String,
}

/// Result of extracting one file.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// `None` when the file had no data rows.
    pub summary: Option<DaySummary>,
    /// Rows whose `User` field could not be classified.
    pub skipped: Vec<SkippedRow>,
}

// ── Classification ────────────────────────────────────────────────────────────

fn digits_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("regex is valid"))
}

/// Map a `User` value such as `"Machine2-Day"` to its counter key.
///
/// The first run of digits is the machine number; the shift is Day when the
/// text contains `"Day"` and Night otherwise.
pub fn classify_user(user: &str) -> Result<ShiftKey> {
    let digits = digits_pattern()
        .find(user)
        .ok_or_else(|| ReportError::MalformedUser(user.to_string()))?;
    let machine_id = digits
        .as_str()
        .parse::<u32>()
        .map_err(|_| ReportError::MalformedUser(user.to_string()))?;
    ShiftKey::new(machine_id, Shift::from_user(user))
}

// ── Extraction ────────────────────────────────────────────────────────────────

/// Build the day summary for one file's records.
///
/// The date is resolved from the first record's `Start date`, then from
/// `file_name`. Rows whose `User` is missing or unclassifiable are skipped
/// and reported; every other row adds one part and its `Seconds` to the
/// matching counter.
pub fn extract_day(records: &[RawRecord], file_name: &str) -> Extraction {
    let Some(first) = records.first() else {
        debug!("{}: no rows, nothing to summarise", file_name);
        return Extraction {
            summary: None,
            skipped: Vec::new(),
        };
    };

    let date = resolve_day_date(first.start_date.as_ref(), file_name);
    let mut summary = DaySummary::new(date, file_name);
    let mut skipped = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let classified = match record.user.as_deref() {
            Some(user) => classify_user(user),
            None => Err(ReportError::MalformedUser(String::new())),
        };

        match classified {
            Ok(key) => summary.record(key, record.seconds_or_zero()),
            Err(e) => {
                warn!("{}: skipping row {}: {}", file_name, idx + 1, e);
                skipped.push(SkippedRow {
                    row: idx + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "{}: {} parts on {}, {} rows skipped",
        file_name,
        summary.total_parts(),
        summary.date,
        skipped.len()
    );

    Extraction {
        summary: Some(summary),
        skipped,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
