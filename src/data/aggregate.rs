use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use super::filter::label_key;
use super::model::{
    DailyRecord, Heatmap, HourlyAverage, HourlyProfile, HourlyRecord, MonthlySummary,
    MonthlyTrend,
};

// ---------------------------------------------------------------------------
// Aggregation over filtered records
// ---------------------------------------------------------------------------

// Each function returns `None` when its input holds nothing to aggregate.

/// Running sum/count for a mean.
#[derive(Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Sum ridership per calendar month, ascending by month.
///
/// A month appears when at least one dated row falls in it; null counts add
/// nothing to its total.
pub fn monthly_totals(records: &[DailyRecord]) -> Vec<MonthlySummary> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        let Some(date) = record.date else {
            continue;
        };
        *totals.entry(month_start(date)).or_default() += record.ridership.unwrap_or(0.0);
    }
    totals
        .into_iter()
        .map(|(month, total_ridership)| MonthlySummary {
            month,
            total_ridership,
        })
        .collect()
}

/// Monthly totals with their mean and peak month (earliest on ties).
pub fn monthly_trend(records: &[DailyRecord]) -> Option<MonthlyTrend> {
    let months = monthly_totals(records);
    let first = *months.first()?;

    let average = months.iter().map(|m| m.total_ridership).sum::<f64>() / months.len() as f64;
    let peak = months.iter().fold(first, |best, m| {
        if m.total_ridership > best.total_ridership { *m } else { best }
    });

    Some(MonthlyTrend {
        months,
        average,
        peak,
    })
}

/// Mean ridership per hour of day, ascending by hour. Rows with a null hour
/// or a null count are skipped.
pub fn hourly_averages(records: &[HourlyRecord]) -> Vec<HourlyAverage> {
    let mut by_hour: BTreeMap<u8, MeanAccumulator> = BTreeMap::new();
    for record in records {
        let (Some(hour), Some(value)) = (record.hour, record.ridership) else {
            continue;
        };
        by_hour.entry(hour).or_default().push(value);
    }
    by_hour
        .into_iter()
        .filter_map(|(hour, acc)| {
            acc.mean().map(|avg_ridership| HourlyAverage {
                hour,
                avg_ridership,
            })
        })
        .collect()
}

/// Hourly averages with the busiest hour (lowest hour on ties).
pub fn hourly_profile(records: &[HourlyRecord]) -> Option<HourlyProfile> {
    let hours = hourly_averages(records);
    let first = *hours.first()?;
    let peak = hours.iter().fold(first, |best, h| {
        if h.avg_ridership > best.avg_ridership { *h } else { best }
    });
    Some(HourlyProfile { hours, peak })
}

/// Pivot hourly rows into an hour × day-type matrix of mean ridership.
///
/// Day types group case-insensitively; each column keeps the first spelling
/// seen.
pub fn heatmap(records: &[HourlyRecord]) -> Option<Heatmap> {
    let mut cells: BTreeMap<(u8, String), MeanAccumulator> = BTreeMap::new();
    let mut hours = BTreeSet::new();
    let mut day_types: BTreeMap<String, &str> = BTreeMap::new();

    for record in records {
        let (Some(hour), Some(day_type), Some(value)) =
            (record.hour, record.day_type.as_deref(), record.ridership)
        else {
            continue;
        };
        let key = label_key(day_type);
        hours.insert(hour);
        day_types.entry(key.clone()).or_insert(day_type);
        cells.entry((hour, key)).or_default().push(value);
    }

    if cells.is_empty() {
        return None;
    }

    let hours: Vec<u8> = hours.into_iter().collect();
    let matrix: Vec<Vec<Option<f64>>> = hours
        .iter()
        .map(|&h| {
            day_types
                .keys()
                .map(|d| cells.get(&(h, d.clone())).and_then(MeanAccumulator::mean))
                .collect()
        })
        .collect();

    Some(Heatmap {
        hours,
        day_types: day_types.into_values().map(str::to_string).collect(),
        cells: matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(d: NaiveDate, count: f64) -> DailyRecord {
        DailyRecord {
            date: Some(d),
            line: None,
            ridership: Some(count),
        }
    }

    fn hourly(hour: Option<u8>, day_type: &str, count: f64) -> HourlyRecord {
        HourlyRecord {
            hour,
            day_type: Some(day_type.to_string()),
            line_tag: Some("A".to_string()),
            ridership: Some(count),
        }
    }

    #[test]
    fn test_monthly_totals_group_by_month() {
        let rows = vec![
            daily(date(2024, 2, 10), 5.0),
            daily(date(2024, 1, 1), 10.0),
            daily(date(2024, 1, 31), 20.0),
        ];
        let months = monthly_totals(&rows);
        assert_eq!(
            months,
            vec![
                MonthlySummary { month: date(2024, 1, 1), total_ridership: 30.0 },
                MonthlySummary { month: date(2024, 2, 1), total_ridership: 5.0 },
            ]
        );
    }

    #[test]
    fn test_monthly_aggregation_is_associative() {
        let rows: Vec<_> = (0..90)
            .map(|i| daily(date(2024, 1, 1) + chrono::Duration::days(i), (i % 7) as f64 * 3.0))
            .collect();
        let whole = monthly_totals(&rows);

        let (left, right) = rows.split_at(45);
        let mut merged: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for part in [monthly_totals(left), monthly_totals(right)] {
            for m in part {
                *merged.entry(m.month).or_default() += m.total_ridership;
            }
        }
        let merged: Vec<_> = merged
            .into_iter()
            .map(|(month, total_ridership)| MonthlySummary { month, total_ridership })
            .collect();
        assert_eq!(whole, merged);
    }

    #[test]
    fn test_monthly_trend_mean_and_peak() {
        let rows = vec![
            daily(date(2024, 1, 5), 100.0),
            daily(date(2024, 2, 5), 300.0),
            daily(date(2024, 3, 5), 200.0),
        ];
        let trend = monthly_trend(&rows).unwrap();
        assert_eq!(trend.average, 200.0);
        assert_eq!(trend.peak.month, date(2024, 2, 1));
    }

    #[test]
    fn test_peak_month_tie_goes_to_earlier_month() {
        let rows = vec![
            daily(date(2024, 5, 1), 50.0),
            daily(date(2024, 3, 1), 50.0),
            daily(date(2024, 4, 1), 10.0),
        ];
        let trend = monthly_trend(&rows).unwrap();
        assert_eq!(trend.peak.month, date(2024, 3, 1));
    }

    #[test]
    fn test_empty_inputs_yield_no_data() {
        assert!(monthly_trend(&[]).is_none());
        assert!(hourly_profile(&[]).is_none());
        assert!(heatmap(&[]).is_none());
    }

    #[test]
    fn test_hourly_mean_uses_exact_rows() {
        let rows = vec![
            hourly(Some(8), "Weekday", 10.0),
            hourly(Some(8), "Weekday", 20.0),
            hourly(Some(8), "Weekday", 60.0),
            hourly(Some(9), "Weekday", 5.0),
            hourly(None, "Weekday", 1000.0),
        ];
        let averages = hourly_averages(&rows);
        assert_eq!(
            averages,
            vec![
                HourlyAverage { hour: 8, avg_ridership: 30.0 },
                HourlyAverage { hour: 9, avg_ridership: 5.0 },
            ]
        );
        // Recomputation is idempotent
        assert_eq!(hourly_averages(&rows), averages);
    }

    #[test]
    fn test_null_hours_only_is_no_data() {
        let rows = vec![hourly(None, "Weekday", 3.0)];
        assert!(hourly_profile(&rows).is_none());
        assert!(heatmap(&rows).is_none());
    }

    #[test]
    fn test_peak_hour_tie_goes_to_lowest_hour() {
        let rows = vec![
            hourly(Some(18), "Weekday", 90.0),
            hourly(Some(7), "Weekday", 90.0),
            hourly(Some(12), "Weekday", 40.0),
        ];
        assert_eq!(hourly_profile(&rows).unwrap().peak.hour, 7);
    }

    #[test]
    fn test_heatmap_leaves_missing_pairs_undefined() {
        let rows = vec![
            hourly(Some(7), "Weekday", 10.0),
            hourly(Some(7), "Weekday", 30.0),
            hourly(Some(7), "Weekend", 4.0),
            hourly(Some(8), "Weekday", 50.0),
        ];
        let map = heatmap(&rows).unwrap();
        assert_eq!(map.hours, vec![7, 8]);
        assert_eq!(map.day_types, vec!["Weekday", "Weekend"]);
        assert_eq!(map.get(7, "Weekday"), Some(20.0));
        assert_eq!(map.get(7, "Weekend"), Some(4.0));
        assert_eq!(map.get(8, "Weekend"), None);
        assert_eq!(map.value_range(), Some((4.0, 50.0)));
    }

    #[test]
    fn test_heatmap_merges_day_types_differing_in_case() {
        let rows = vec![
            hourly(Some(7), "Weekday", 10.0),
            hourly(Some(7), "weekday ", 30.0),
            hourly(Some(7), "Weekend", 4.0),
        ];
        let map = heatmap(&rows).unwrap();
        assert_eq!(map.day_types, vec!["Weekday", "Weekend"]);
        assert_eq!(map.get(7, "Weekday"), Some(20.0));
        assert_eq!(map.get(7, "WEEKDAY"), Some(20.0));
    }
}
