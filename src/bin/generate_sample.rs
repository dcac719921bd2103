use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;

const LINES: [(&str, f64); 2] = [("Seremban", 1.0), ("Port Klang", 0.7)];

/// Public holidays in the sample year.
const HOLIDAYS: [(u32, u32); 4] = [(1, 1), (5, 1), (8, 31), (12, 25)];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Noisy non-negative count around `mean`.
    fn count(&mut self, mean: f64, rel_noise: f64) -> i64 {
        self.gauss(mean, mean * rel_noise).max(0.0).round() as i64
    }
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Expected passengers in `hour` for a day type: a night floor plus morning
/// and evening peaks on weekdays, one broad midday hump otherwise.
fn hourly_mean(hour: u32, day_type: &str) -> f64 {
    let h = hour as f64;
    let base = if (1..=4).contains(&hour) { 20.0 } else { 120.0 };
    match day_type {
        "Weekday" => base + gaussian(h, 8.0, 1.0, 900.0) + gaussian(h, 18.0, 1.2, 800.0),
        _ => base + gaussian(h, 13.0, 3.5, 350.0),
    }
}

fn day_type_for(date: NaiveDate) -> &'static str {
    if HOLIDAYS.contains(&(date.month(), date.day())) {
        "Public Holiday"
    } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        "Weekend"
    } else {
        "Weekday"
    }
}

struct HourlyRow {
    time: String,
    day_type: &'static str,
    line_tag: &'static str,
    ridership: i64,
}

/// Writes `komuter_ridership_daily_v2.csv`, `komuter_hourly_schedule_combined_iqbal_v2.csv`
/// and the same hourly rows as `komuter_hourly_sample.parquet`.
fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("start date")?;
    let days: Vec<NaiveDate> = (0..366).map(|i| start + Duration::days(i)).collect();

    // ---- Daily table ----
    let daily_path = "komuter_ridership_daily_v2.csv";
    let mut daily = csv::Writer::from_path(daily_path).context("creating daily CSV")?;
    daily.write_record(["date", "line", "ridership"])?;
    let mut daily_rows = 0usize;
    for &date in &days {
        let seasonal = 1.0 + 0.15 * (date.ordinal() as f64 / 366.0 * std::f64::consts::TAU).sin();
        let day_factor = match day_type_for(date) {
            "Weekday" => 1.0,
            "Weekend" => 0.55,
            _ => 0.4,
        };
        for &(line, scale) in &LINES {
            let riders = rng.count(30_000.0 * scale * seasonal * day_factor, 0.08);
            daily.write_record([date.to_string(), line.to_string(), riders.to_string()])?;
            daily_rows += 1;
        }
    }
    daily.flush()?;

    // ---- Hourly table: every 13th day ----
    let mut hourly_rows = Vec::new();
    for &date in days.iter().step_by(13) {
        let day_type = day_type_for(date);
        for &(line, scale) in &LINES {
            for hour in 0..24u32 {
                hourly_rows.push(HourlyRow {
                    time: format!("{date} {hour:02}:00:00"),
                    day_type,
                    line_tag: line,
                    ridership: rng.count(hourly_mean(hour, day_type) * scale, 0.15),
                });
            }
        }
    }

    let hourly_path = "komuter_hourly_schedule_combined_iqbal_v2.csv";
    let mut hourly = csv::Writer::from_path(hourly_path).context("creating hourly CSV")?;
    hourly.write_record(["time", "day_type", "line_tag", "ridership"])?;
    for row in &hourly_rows {
        let count = row.ridership.to_string();
        hourly.write_record([row.time.as_str(), row.day_type, row.line_tag, count.as_str()])?;
    }
    hourly.flush()?;

    // ---- Same hourly rows as Parquet ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Utf8, false),
        Field::new("day_type", DataType::Utf8, false),
        Field::new("line_tag", DataType::Utf8, false),
        Field::new("ridership", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                hourly_rows.iter().map(|r| r.time.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                hourly_rows.iter().map(|r| r.day_type).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                hourly_rows.iter().map(|r| r.line_tag).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                hourly_rows.iter().map(|r| r.ridership).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "komuter_hourly_sample.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("Wrote {daily_rows} daily rows to {daily_path}");
    println!(
        "Wrote {} hourly rows to {hourly_path} and {parquet_path}",
        hourly_rows.len()
    );
    Ok(())
}
