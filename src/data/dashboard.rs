use serde::Serialize;

use super::aggregate::{heatmap, hourly_profile, monthly_trend};
use super::filter::{DateRange, filter_by_category, filter_by_date, filter_by_line};
use super::model::{Datasets, Heatmap, HourlyProfile, MonthlyTrend};
use super::recommend::{Recommendation, Role, recommend};

// ---------------------------------------------------------------------------
// Selection – the user's filter choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub role: Role,
    pub day_type: Option<String>,
    pub line: Option<String>,
    /// `None` only when the daily table has no parseable date at all.
    pub range: Option<DateRange>,
}

impl Selection {
    /// Defaults taken from the data: first day type and line in sorted order,
    /// and the full span of the daily table.
    pub fn defaults_for(datasets: &Datasets) -> Self {
        Selection {
            role: Role::default(),
            day_type: datasets.hourly.day_types.iter().next().cloned(),
            line: datasets.hourly.lines.iter().next().cloned(),
            range: datasets
                .daily
                .date_span()
                .map(|(start, end)| DateRange::new(start, end)),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard – every output for one selection
// ---------------------------------------------------------------------------

/// All chart series and statements for one selection, rebuilt from scratch on
/// every filter change. Each output is `None` when the selection leaves
/// nothing to aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub monthly: Option<MonthlyTrend>,
    pub hourly: Option<HourlyProfile>,
    pub heatmap: Option<Heatmap>,
    pub recommendation: Option<Recommendation>,
    /// Daily rows left after the date (and line) filter.
    pub daily_rows: usize,
    /// Hourly rows left after the day-type and line filter.
    pub hourly_rows: usize,
    #[serde(skip)]
    day_type: Option<String>,
}

impl Dashboard {
    pub fn compute(datasets: &Datasets, selection: &Selection) -> Self {
        let daily = match selection.range {
            Some(range) => filter_by_date(&datasets.daily.records, range),
            None => Vec::new(),
        };
        let daily = match (&selection.line, datasets.daily.has_line) {
            (Some(line), true) => filter_by_line(&daily, line),
            (None, true) => Vec::new(),
            (_, false) => daily,
        };

        let hourly = match (&selection.day_type, &selection.line) {
            (Some(day_type), Some(line)) => {
                filter_by_category(&datasets.hourly.records, day_type, line)
            }
            _ => Vec::new(),
        };

        let monthly = monthly_trend(&daily);
        let profile = hourly_profile(&hourly);
        let recommendation = profile
            .as_ref()
            .and_then(|p| recommend(&p.hours, selection.role));

        log::debug!(
            "Recomputed dashboard: {} daily rows, {} hourly rows",
            daily.len(),
            hourly.len()
        );

        Dashboard {
            monthly,
            hourly: profile,
            heatmap: heatmap(&hourly),
            recommendation,
            daily_rows: daily.len(),
            hourly_rows: hourly.len(),
            day_type: selection.day_type.clone(),
        }
    }

    /// Average and peak month, or the no-data notice.
    pub fn monthly_statement(&self) -> Vec<String> {
        match &self.monthly {
            Some(trend) => vec![
                format!(
                    "Average Monthly Ridership: {} passengers",
                    format_count(trend.average)
                ),
                format!(
                    "Peak Month: {} with {} passengers",
                    trend.peak.month.format("%B %Y"),
                    format_count(trend.peak.total_ridership)
                ),
            ],
            None => vec!["No monthly data found for the selected filters.".to_string()],
        }
    }

    /// Peak hour, or the no-data notice.
    pub fn hourly_statement(&self) -> Vec<String> {
        match &self.hourly {
            Some(profile) => vec![
                format!(
                    "Peak Hour: {}:00 with the highest average ridership.",
                    profile.peak.hour
                ),
                format!(
                    "Showing average passengers per hour based on all records for {}s.",
                    self.day_type.as_deref().unwrap_or("all day type").to_lowercase()
                ),
            ],
            None => vec!["No hourly data available for the selected line and day type.".to_string()],
        }
    }

    pub fn recommendation_statement(&self) -> String {
        match &self.recommendation {
            Some(rec) => {
                let hours = rec
                    .hours
                    .iter()
                    .map(|h| h.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                match rec.role {
                    Role::Tourist => {
                        format!("Recommended Hours for Tourists (Least Crowded): {hours}")
                    }
                    Role::Worker => format!("Typical Worker Commute Hours (High Demand): {hours}"),
                }
            }
            None => "No hourly data to base a recommendation on.".to_string(),
        }
    }
}

/// Round to a whole number and group thousands with commas.
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}
