use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::filter::{label_key, labels_match};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Timestamp(ts) => write!(f, "{ts}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text of a label-like cell, trimmed. `None` for nulls and blanks.
    pub fn as_label(&self) -> Option<String> {
        let text = match self {
            CellValue::Null => return None,
            CellValue::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

// ---------------------------------------------------------------------------
// RawTable – what the format readers produce
// ---------------------------------------------------------------------------

/// A table straight out of a reader: declared column order plus typed rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names in declared order (normalised once the loader is done).
    pub columns: Vec<String>,
    /// Rows, each with one cell per column.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// A column counts as numeric when it holds at least one value and every
    /// non-null cell is an integer or a float.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen = false;
        for row in &self.rows {
            match row.get(idx).unwrap_or(&CellValue::Null) {
                CellValue::Null => {}
                CellValue::Integer(_) | CellValue::Float(_) => seen = true,
                _ => return false,
            }
        }
        seen
    }

    /// Numeric column names in declared order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        (0..self.columns.len())
            .filter(|&i| self.is_numeric_column(i))
            .map(|i| self.columns[i].as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Normalised records
// ---------------------------------------------------------------------------

/// One row of the daily table.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    /// `None` when the source date did not parse.
    pub date: Option<NaiveDate>,
    pub line: Option<String>,
    pub ridership: Option<f64>,
}

/// One row of the hourly table.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    /// Hour of day in `0..=23`; `None` when the time did not parse.
    pub hour: Option<u8>,
    pub day_type: Option<String>,
    pub line_tag: Option<String>,
    pub ridership: Option<f64>,
}

/// The normalised daily table.
#[derive(Debug, Clone)]
pub struct DailyTable {
    pub records: Vec<DailyRecord>,
    /// Name of the column detected as ridership.
    pub ridership_column: String,
    /// Whether the source carried a `line` column.
    pub has_line: bool,
}

impl DailyTable {
    /// Earliest and latest parsed dates, if any row has one.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// The normalised hourly table.
#[derive(Debug, Clone)]
pub struct HourlyTable {
    pub records: Vec<HourlyRecord>,
    pub ridership_column: String,
    /// Sorted unique day types (selector domain). Labels differing only in
    /// case or surrounding blanks appear once, spelled as first seen.
    pub day_types: BTreeSet<String>,
    /// Sorted unique line tags, deduplicated like `day_types`.
    pub lines: BTreeSet<String>,
}

/// First spelling of every distinct label key.
fn distinct_labels<'a>(labels: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for label in labels {
        seen.entry(label_key(label)).or_insert(label);
    }
    seen.into_values().map(str::to_string).collect()
}

impl HourlyTable {
    pub fn from_records(records: Vec<HourlyRecord>, ridership_column: String) -> Self {
        let day_types = distinct_labels(records.iter().filter_map(|r| r.day_type.as_deref()));
        let lines = distinct_labels(records.iter().filter_map(|r| r.line_tag.as_deref()));
        HourlyTable {
            records,
            ridership_column,
            day_types,
            lines,
        }
    }
}

/// Both tables, loaded together and shared read-only for the session.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub daily: DailyTable,
    pub hourly: HourlyTable,
}

// ---------------------------------------------------------------------------
// Derived series
// ---------------------------------------------------------------------------

/// Total ridership of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// First day of the month.
    pub month: NaiveDate,
    pub total_ridership: f64,
}

/// Mean ridership of one hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: u8,
    pub avg_ridership: f64,
}

/// Monthly totals with their mean and peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub months: Vec<MonthlySummary>,
    pub average: f64,
    pub peak: MonthlySummary,
}

/// Per-hour averages with the busiest hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyProfile {
    pub hours: Vec<HourlyAverage>,
    pub peak: HourlyAverage,
}

/// Mean ridership by hour (rows) and day type (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub hours: Vec<u8>,
    pub day_types: Vec<String>,
    /// `cells[row][col]`; `None` where the pair has no observations.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    pub fn get(&self, hour: u8, day_type: &str) -> Option<f64> {
        let row = self.hours.iter().position(|&h| h == hour)?;
        let col = self.day_types.iter().position(|d| labels_match(d, day_type))?;
        self.cells[row][col]
    }

    /// Smallest and largest defined cell values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.cells.iter().flatten().flatten().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
