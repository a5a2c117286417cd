use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ReportError, Result};

/// Date label used when no date could be resolved for a file.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Lowest CNC number on the shop floor.
pub const MIN_MACHINE_ID: u8 = 1;
/// Highest CNC number on the shop floor.
pub const MAX_MACHINE_ID: u8 = 4;

/// Work period a production event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    /// Both shifts in display order.
    pub const ALL: [Shift; 2] = [Shift::Day, Shift::Night];

    /// Classify a `User` value: anything mentioning `"Day"` is a day shift.
    pub fn from_user(user: &str) -> Self {
        if user.contains("Day") {
            Shift::Day
        } else {
            Shift::Night
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "Day",
            Shift::Night => "Night",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite `(machine, shift)` key identifying one counter.
///
/// Ordering is machine first, then Day before Night, which is also the
/// order counters are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ShiftKey {
    pub machine_id: u8,
    pub shift: Shift,
}

impl ShiftKey {
    /// Build a key, rejecting machine numbers outside the known CNC range.
    pub fn new(machine_id: u32, shift: Shift) -> Result<Self> {
        if !(u32::from(MIN_MACHINE_ID)..=u32::from(MAX_MACHINE_ID)).contains(&machine_id) {
            return Err(ReportError::MachineOutOfRange(machine_id));
        }
        Ok(Self {
            machine_id: machine_id as u8,
            shift,
        })
    }

    /// All eight keys in canonical order (`1 Day`, `1 Night`, `2 Day`, ...).
    pub fn all() -> impl Iterator<Item = ShiftKey> {
        (MIN_MACHINE_ID..=MAX_MACHINE_ID).flat_map(|machine_id| {
            Shift::ALL
                .into_iter()
                .map(move |shift| ShiftKey { machine_id, shift })
        })
    }

    /// Column label used by the chart export, e.g. `"2 Night"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.machine_id, self.shift)
    }
}

/// Value of the optional `Start date` column.
#[derive(Debug, Clone, PartialEq)]
pub enum StartDate {
    /// Spreadsheet serial: whole days since the epoch plus a time-of-day fraction.
    Serial(f64),
    /// Free text, expected as `D/M/YYYY H:MM:SS AM|PM`.
    Text(String),
}

/// One spreadsheet row, reduced to the columns the report cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// `User` column, encoding machine number and shift.
    pub user: Option<String>,
    /// `Seconds` column, already coerced to a number when possible.
    pub seconds: Option<f64>,
    /// `Start date` column.
    pub start_date: Option<StartDate>,
}

impl RawRecord {
    /// Duration contributed by this row; missing, non-finite or negative
    /// values count as zero.
    pub fn seconds_or_zero(&self) -> f64 {
        match self.seconds {
            Some(s) if s.is_finite() && s > 0.0 => s,
            _ => 0.0,
        }
    }
}

/// Parts and machining time accumulated for one `(machine, shift)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShiftCounter {
    pub machine_id: u8,
    pub shift: Shift,
    pub total_parts: u64,
    pub total_seconds: f64,
}

impl ShiftCounter {
    fn empty(key: ShiftKey) -> Self {
        Self {
            machine_id: key.machine_id,
            shift: key.shift,
            total_parts: 0,
            total_seconds: 0.0,
        }
    }

    pub fn key(&self) -> ShiftKey {
        ShiftKey {
            machine_id: self.machine_id,
            shift: self.shift,
        }
    }

    /// Whole minutes of machining time, floored.
    pub fn total_minutes(&self) -> u64 {
        minutes_from_seconds(self.total_seconds)
    }

    fn add(&mut self, seconds: f64) {
        self.total_parts += 1;
        self.total_seconds += seconds;
    }
}

/// Floor a duration in seconds to whole minutes.
pub fn minutes_from_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds / 60.0).floor() as u64
    } else {
        0
    }
}

/// Counters for every CNC and shift of one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    /// `YYYY-MM-DD`, or [`UNKNOWN_DATE`].
    pub date: String,
    /// File name the summary was built from.
    pub source: String,
    #[serde(serialize_with = "serialize_counters")]
    counters: BTreeMap<ShiftKey, ShiftCounter>,
}

impl DaySummary {
    /// A summary with all eight counters at zero.
    pub fn new(date: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            source: source.into(),
            counters: ShiftKey::all()
                .map(|key| (key, ShiftCounter::empty(key)))
                .collect(),
        }
    }

    /// Count one produced part of `seconds` duration against `key`.
    pub fn record(&mut self, key: ShiftKey, seconds: f64) {
        self.counters
            .entry(key)
            .or_insert_with(|| ShiftCounter::empty(key))
            .add(seconds);
    }

    pub fn counter(&self, key: ShiftKey) -> Option<&ShiftCounter> {
        self.counters.get(&key)
    }

    /// Counters in canonical key order.
    pub fn counters(&self) -> impl Iterator<Item = &ShiftCounter> {
        self.counters.values()
    }

    /// Parts produced across every machine and shift.
    pub fn total_parts(&self) -> u64 {
        self.counters.values().map(|c| c.total_parts).sum()
    }
}

fn serialize_counters<S>(
    counters: &BTreeMap<ShiftKey, ShiftCounter>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(counters.values())
}
