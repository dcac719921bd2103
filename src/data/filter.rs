use chrono::NaiveDate;

use super::model::{DailyRecord, HourlyRecord};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Inclusive calendar date range. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Grouping key for a label: trimmed and lowercased.
pub fn label_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Case-insensitive comparison of trimmed labels.
pub fn labels_match(value: &str, selected: &str) -> bool {
    label_key(value) == label_key(selected)
}

/// Keep daily rows whose date lies in `range`. Rows without a date never match.
pub fn filter_by_date(records: &[DailyRecord], range: DateRange) -> Vec<DailyRecord> {
    records
        .iter()
        .filter(|r| r.date.is_some_and(|d| range.contains(d)))
        .cloned()
        .collect()
}

/// Keep daily rows recorded for `line`. Rows without a line never match.
pub fn filter_by_line(records: &[DailyRecord], line: &str) -> Vec<DailyRecord> {
    records
        .iter()
        .filter(|r| r.line.as_deref().is_some_and(|l| labels_match(l, line)))
        .cloned()
        .collect()
}

/// Keep hourly rows matching both the selected day type and line.
pub fn filter_by_category(
    records: &[HourlyRecord],
    day_type: &str,
    line: &str,
) -> Vec<HourlyRecord> {
    records
        .iter()
        .filter(|r| {
            r.day_type.as_deref().is_some_and(|d| labels_match(d, day_type))
                && r.line_tag.as_deref().is_some_and(|l| labels_match(l, line))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(d: Option<NaiveDate>, line: &str) -> DailyRecord {
        DailyRecord {
            date: d,
            line: Some(line.to_string()),
            ridership: Some(1.0),
        }
    }

    fn hourly(day_type: &str, line: &str) -> HourlyRecord {
        HourlyRecord {
            hour: Some(8),
            day_type: Some(day_type.to_string()),
            line_tag: Some(line.to_string()),
            ridership: Some(10.0),
        }
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let rows: Vec<_> = (1..=10).map(|d| daily(Some(date(2024, 1, d)), "A")).collect();
        let out = filter_by_date(&rows, DateRange::new(date(2024, 1, 3), date(2024, 1, 7)));
        assert_eq!(out.len(), 5);
        for r in &out {
            let d = r.date.unwrap();
            assert!(d >= date(2024, 1, 3) && d <= date(2024, 1, 7));
        }
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let rows: Vec<_> = (1..=10).map(|d| daily(Some(date(2024, 1, d)), "A")).collect();
        let out = filter_by_date(&rows, DateRange::new(date(2024, 1, 7), date(2024, 1, 3)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_null_dates_are_excluded() {
        let rows = vec![daily(None, "A"), daily(Some(date(2024, 1, 1)), "A")];
        let out = filter_by_date(&rows, DateRange::new(date(1900, 1, 1), date(2100, 1, 1)));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let rows = vec![
            hourly("Weekday", "Seremban"),
            hourly(" weekday ", "SEREMBAN"),
            hourly("Weekend", "Seremban"),
            hourly("Weekday", "Port Klang"),
        ];
        let out = filter_by_category(&rows, "WEEKDAY", "seremban");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_category_filter_no_match() {
        let rows = vec![hourly("Weekday", "Seremban")];
        assert!(filter_by_category(&rows, "Weekend", "ZZZ").is_empty());
    }

    #[test]
    fn test_line_filter() {
        let rows = vec![daily(Some(date(2024, 1, 1)), "Seremban"), daily(Some(date(2024, 1, 1)), "Other")];
        let out = filter_by_line(&rows, "seremban");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].line.as_deref(), Some("Seremban"));
    }

    #[test]
    fn test_filters_leave_input_untouched() {
        let rows = vec![hourly("Weekday", "A"), hourly("Weekend", "A")];
        let before = rows.clone();
        let _ = filter_by_category(&rows, "Weekday", "A");
        assert_eq!(rows, before);
    }
}
