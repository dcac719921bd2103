use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType};
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::detect::detect_ridership_column;
use super::error::{SchemaError, TableKind};
use super::model::{
    CellValue, DailyRecord, DailyTable, Datasets, HourlyRecord, HourlyTable, RawTable,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and normalise both input tables.
pub fn load_datasets(daily_path: &Path, hourly_path: &Path) -> Result<Datasets> {
    let daily = load_daily(daily_path)
        .with_context(|| format!("loading daily table {}", daily_path.display()))?;
    let hourly = load_hourly(hourly_path)
        .with_context(|| format!("loading hourly table {}", hourly_path.display()))?;
    Ok(Datasets { daily, hourly })
}

pub fn load_daily(path: &Path) -> Result<DailyTable> {
    let raw = read_table(path)?;
    let table = daily_from_raw(raw)?;
    log::info!(
        "Loaded {} daily rows from {} (ridership column '{}')",
        table.records.len(),
        path.display(),
        table.ridership_column
    );
    Ok(table)
}

pub fn load_hourly(path: &Path) -> Result<HourlyTable> {
    let raw = read_table(path)?;
    let table = hourly_from_raw(raw)?;
    log::info!(
        "Loaded {} hourly rows from {} (ridership column '{}', {} day types, {} lines)",
        table.records.len(),
        path.display(),
        table.ridership_column,
        table.day_types.len(),
        table.lines.len()
    );
    Ok(table)
}

/// Read a tabular file into a [`RawTable`] with normalised column names.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "date": "...", "ridership": 123, ... }, ...]`
/// * `.parquet` – flat columns, as written by Pandas or Polars
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    normalize_columns(&mut table);
    Ok(table)
}

/// Trim and lowercase every column name.
pub fn normalize_columns(table: &mut RawTable) {
    for col in &mut table.columns {
        *col = col.trim().to_lowercase();
    }
}

// ---------------------------------------------------------------------------
// Normalisation into typed tables
// ---------------------------------------------------------------------------

pub fn daily_from_raw(raw: RawTable) -> Result<DailyTable, SchemaError> {
    let Some(date_idx) = raw.column_index("date") else {
        return Err(SchemaError::MissingColumns {
            table: TableKind::Daily,
            columns: vec!["date".to_string()],
        });
    };
    let ridership_column = detect_ridership_column(&raw, TableKind::Daily)?;
    let ridership_idx = raw
        .column_index(&ridership_column)
        .ok_or(SchemaError::NoNumericColumn { table: TableKind::Daily })?;
    let line_idx = raw.column_index("line");

    let mut bad_dates = 0usize;
    let mut bad_counts = 0usize;
    let records = raw
        .rows
        .iter()
        .map(|row| {
            let date_cell = cell(row, date_idx);
            let date = parse_date(date_cell);
            if date.is_none() && !date_cell.is_null() {
                bad_dates += 1;
            }
            let count_cell = cell(row, ridership_idx);
            let ridership = ridership_value(count_cell);
            if ridership.is_none() && !count_cell.is_null() {
                bad_counts += 1;
            }
            DailyRecord {
                date,
                line: line_idx.and_then(|i| cell(row, i).as_label()),
                ridership,
            }
        })
        .collect();

    if bad_dates > 0 {
        log::warn!("{bad_dates} daily row(s) have an unparseable date");
    }
    if bad_counts > 0 {
        log::warn!("{bad_counts} daily row(s) have a negative or non-finite ridership count");
    }

    Ok(DailyTable {
        records,
        ridership_column,
        has_line: line_idx.is_some(),
    })
}

pub fn hourly_from_raw(raw: RawTable) -> Result<HourlyTable, SchemaError> {
    let day_type_idx = raw.column_index("day_type");
    let line_idx = raw.column_index("line_tag");
    let time_idx = raw.column_index("time").or_else(|| raw.column_index("hour"));

    let mut missing = Vec::new();
    if time_idx.is_none() {
        missing.push("time or hour".to_string());
    }
    if day_type_idx.is_none() {
        missing.push("day_type".to_string());
    }
    if line_idx.is_none() {
        missing.push("line_tag".to_string());
    }
    let (Some(time_idx), Some(day_type_idx), Some(line_idx)) = (time_idx, day_type_idx, line_idx)
    else {
        return Err(SchemaError::MissingColumns {
            table: TableKind::Hourly,
            columns: missing,
        });
    };

    let ridership_column = detect_ridership_column(&raw, TableKind::Hourly)?;
    let ridership_idx = raw
        .column_index(&ridership_column)
        .ok_or(SchemaError::NoNumericColumn { table: TableKind::Hourly })?;

    let mut bad_hours = 0usize;
    let records = raw
        .rows
        .iter()
        .map(|row| {
            let time_cell = cell(row, time_idx);
            let hour = parse_hour(time_cell);
            if hour.is_none() && !time_cell.is_null() {
                bad_hours += 1;
            }
            HourlyRecord {
                hour,
                day_type: cell(row, day_type_idx).as_label(),
                line_tag: cell(row, line_idx).as_label(),
                ridership: ridership_value(cell(row, ridership_idx)),
            }
        })
        .collect();

    if bad_hours > 0 {
        log::warn!("{bad_hours} hourly row(s) have an unparseable time");
    }

    Ok(HourlyTable::from_records(records, ridership_column))
}

fn cell(row: &[CellValue], idx: usize) -> &CellValue {
    const NULL: &CellValue = &CellValue::Null;
    row.get(idx).unwrap_or(NULL)
}

/// Non-negative finite count, or `None`.
fn ridership_value(value: &CellValue) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite() && *v >= 0.0)
}

// ---------------------------------------------------------------------------
// Date / time parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d %b %Y"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Parse a calendar date out of a cell.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Timestamp(ts) => Some(ts.date()),
        CellValue::String(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| parse_datetime(s).map(|ts| ts.date()))
        }
        _ => None,
    }
}

/// Parse an hour of day (0–23) out of a time-like cell.
///
/// Accepts full timestamps, bare clock times, and integer hours. A date with
/// no time component is not an hour.
pub fn parse_hour(value: &CellValue) -> Option<u8> {
    match value {
        CellValue::Timestamp(ts) => Some(ts.hour() as u8),
        CellValue::Integer(h) => u8::try_from(*h).ok().filter(|h| *h < 24),
        CellValue::Float(h) if h.fract() == 0.0 && (0.0..24.0).contains(h) => Some(*h as u8),
        CellValue::String(s) => {
            let s = s.trim();
            if let Some(ts) = parse_datetime(s) {
                return Some(ts.hour() as u8);
            }
            if let Some(t) = TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
            {
                return Some(t.hour() as u8);
            }
            s.parse::<u8>().ok().filter(|h| *h < 24)
        }
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cell types are inferred per cell.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let record = result.with_context(|| format!("CSV line {}", row_no + 2))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "date": "2024-01-01", "line": "Seremban", "ridership": 1520 },
///   ...
/// ]
/// ```
///
/// Column order is the order keys are first seen. Pandas writes datetime
/// columns as epoch milliseconds; integers in a `date` or `time` column that
/// large are read back as timestamps.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let temporal: Vec<bool> = columns
        .iter()
        .map(|c| matches!(c.trim().to_lowercase().as_str(), "date" | "time"))
        .collect();

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .zip(&temporal)
                .map(|(col, &is_temporal)| {
                    let cell = obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null);
                    if is_temporal { epoch_millis_to_timestamp(cell) } else { cell }
                })
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

/// Smallest magnitude read as epoch milliseconds (early March 1973).
/// Hour numbers and compact `yyyymmdd` integers stay well below it.
const EPOCH_MILLIS_FLOOR: u64 = 100_000_000_000;

fn epoch_millis_to_timestamp(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Integer(ms) if ms.unsigned_abs() >= EPOCH_MILLIS_FLOOR => {
            match DateTime::from_timestamp_millis(ms) {
                Some(dt) => CellValue::Timestamp(dt.naive_utc()),
                None => CellValue::Integer(ms),
            }
        }
        other => other,
    }
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns (strings, integers, floats, bools,
/// dates, timestamps). Nested columns are rendered as text.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let column_cells: Vec<Vec<CellValue>> = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                arrow_column_cells(col).with_context(|| format!("reading column '{name}'"))
            })
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            rows.push(column_cells.iter().map(|c| c[row].clone()).collect());
        }
    }

    Ok(RawTable { columns, rows })
}

// -- Arrow helpers --

/// Convert a whole Arrow column into cells, widening numeric and temporal
/// types to a single representation first.
fn arrow_column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let len = col.len();
    let cells: Vec<CellValue> = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let arr = cast(col, &DataType::Int64).context("widening integer column")?;
            let arr = arr.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| nullable(arr, i, |i| CellValue::Integer(arr.value(i))))
                .collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let arr = cast(col, &DataType::Float64).context("widening float column")?;
            let arr = arr.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| nullable(arr, i, |i| CellValue::Float(arr.value(i))))
                .collect()
        }
        DataType::Utf8 => {
            let arr = col.as_string::<i32>();
            (0..len)
                .map(|i| nullable(arr, i, |i| CellValue::String(arr.value(i).to_string())))
                .collect()
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            (0..len)
                .map(|i| nullable(arr, i, |i| CellValue::String(arr.value(i).to_string())))
                .collect()
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..len)
                .map(|i| nullable(arr, i, |i| CellValue::Bool(arr.value(i))))
                .collect()
        }
        DataType::Date32 | DataType::Date64 => {
            let arr = cast(col, &DataType::Date32).context("normalising date column")?;
            let arr = arr.as_primitive::<Date32Type>();
            (0..len)
                .map(|i| {
                    arr.value_as_date(i)
                        .filter(|_| !arr.is_null(i))
                        .map_or(CellValue::Null, CellValue::Date)
                })
                .collect()
        }
        DataType::Timestamp(_, _) => {
            let arr = cast(col, &DataType::Timestamp(TimeUnit::Microsecond, None))
                .context("normalising timestamp column")?;
            let arr = arr.as_primitive::<TimestampMicrosecondType>();
            (0..len)
                .map(|i| {
                    arr.value_as_datetime(i)
                        .filter(|_| !arr.is_null(i))
                        .map_or(CellValue::Null, CellValue::Timestamp)
                })
                .collect()
        }
        _ => (0..len)
            .map(|i| {
                if col.is_null(i) {
                    Ok(CellValue::Null)
                } else {
                    array_value_to_string(col, i).map(CellValue::String)
                }
            })
            .collect::<Result<_, _>>()
            .context("formatting column")?,
    };
    Ok(cells)
}

fn nullable(arr: &dyn Array, i: usize, value: impl FnOnce(usize) -> CellValue) -> CellValue {
    if arr.is_null(i) { CellValue::Null } else { value(i) }
}
