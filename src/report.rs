use anyhow::{Context, Result};

use crate::config::{ReportArgs, Sources};
use crate::data::cache::DatasetCache;
use crate::data::dashboard::{Dashboard, Selection, format_count};
use crate::data::filter::DateRange;
use crate::data::model::Datasets;

// ---------------------------------------------------------------------------
// Headless report: one pass, printed to stdout
// ---------------------------------------------------------------------------

pub fn run(sources: &Sources, args: &ReportArgs) -> Result<()> {
    let datasets = DatasetCache::new().get_or_load(&sources.daily, &sources.hourly)?;
    let selection = selection_from_args(&datasets, args);
    let dashboard = Dashboard::compute(&datasets, &selection);

    if args.json {
        let json = serde_json::to_string_pretty(&dashboard).context("serializing report")?;
        println!("{json}");
    } else {
        print!("{}", render_text(&selection, &dashboard));
    }
    Ok(())
}

/// Data-driven defaults, overridden by whatever was passed on the command line.
pub fn selection_from_args(datasets: &Datasets, args: &ReportArgs) -> Selection {
    let defaults = Selection::defaults_for(datasets);
    let range = match (args.from, args.to, defaults.range) {
        (Some(start), Some(end), _) => Some(DateRange::new(start, end)),
        (start, end, Some(full)) => Some(DateRange::new(
            start.unwrap_or(full.start),
            end.unwrap_or(full.end),
        )),
        (_, _, None) => None,
    };
    Selection {
        role: args.role,
        day_type: args.day_type.clone().or(defaults.day_type),
        line: args.line.clone().or(defaults.line),
        range,
    }
}

pub fn render_text(selection: &Selection, dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let line = selection.line.as_deref().unwrap_or("-");
    let day_type = selection.day_type.as_deref().unwrap_or("-");

    out.push_str(&format!("Monthly Ridership Trend ({line})\n"));
    if let Some(trend) = &dashboard.monthly {
        for m in &trend.months {
            out.push_str(&format!(
                "  {}  {:>12}\n",
                m.month.format("%Y-%m"),
                format_count(m.total_ridership)
            ));
        }
    }
    for s in dashboard.monthly_statement() {
        out.push_str(&format!("  {s}\n"));
    }

    out.push_str(&format!("\nAverage Hourly Ridership Pattern ({day_type}, {line})\n"));
    if let Some(profile) = &dashboard.hourly {
        for h in &profile.hours {
            out.push_str(&format!(
                "  {:02}:00  {:>12}\n",
                h.hour,
                format_count(h.avg_ridership)
            ));
        }
    }
    for s in dashboard.hourly_statement() {
        out.push_str(&format!("  {s}\n"));
    }

    out.push_str(&format!("\nSuggested Travel Times ({})\n", selection.role));
    out.push_str(&format!("  {}\n", dashboard.recommendation_statement()));
    if let Some(rec) = &dashboard.recommendation {
        out.push_str(&format!(
            "  Recommendation threshold: {}\n",
            format_count(rec.threshold)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::recommend::Role;
    use chrono::NaiveDate;

    fn write_inputs(dir: &tempfile::TempDir) -> Sources {
        let daily = dir.path().join("daily.csv");
        let hourly = dir.path().join("hourly.csv");
        std::fs::write(
            &daily,
            "Date,Line,Ridership_Count\n2024-01-02,Seremban,1200\n2024-02-03,Seremban,500\n2024-02-04,Seremban,400\n",
        )
        .unwrap();
        std::fs::write(
            &hourly,
            "time,day_type,line_tag,ridership\n\
             2024-01-02 07:00:00,Weekday,Seremban,300\n\
             2024-01-02 13:00:00,Weekday,Seremban,40\n\
             2024-01-02 18:00:00,Weekday,Seremban,250\n\
             2024-01-06 10:00:00,Weekend,Seremban,90\n",
        )
        .unwrap();
        Sources { daily, hourly }
    }

    #[test]
    fn test_selection_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_inputs(&dir);
        let ds = crate::data::loader::load_datasets(&sources.daily, &sources.hourly).unwrap();

        let args = ReportArgs {
            role: Role::Worker,
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..ReportArgs::default()
        };
        let sel = selection_from_args(&ds, &args);
        assert_eq!(sel.role, Role::Worker);
        assert_eq!(sel.day_type.as_deref(), Some("Weekday"));
        let range = sel.range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());
    }

    #[test]
    fn test_text_report() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_inputs(&dir);
        let ds = crate::data::loader::load_datasets(&sources.daily, &sources.hourly).unwrap();
        let sel = selection_from_args(&ds, &ReportArgs::default());
        let text = render_text(&sel, &Dashboard::compute(&ds, &sel));

        assert!(text.contains("Peak Month: January 2024 with 1,200 passengers"));
        assert!(text.contains("Peak Hour: 7:00"));
        assert!(text.contains("Recommended Hours for Tourists (Least Crowded): 13"));
    }

    #[test]
    fn test_run_with_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sources = Sources {
            daily: dir.path().join("missing.csv"),
            hourly: dir.path().join("missing_too.csv"),
        };
        assert!(run(&sources, &ReportArgs::default()).is_err());
    }
}
