use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::data::recommend::Role;

pub const DEFAULT_DAILY: &str = "komuter_ridership_daily_v2.csv";
pub const DEFAULT_HOURLY: &str = "komuter_hourly_schedule_combined_iqbal_v2.csv";

#[derive(Parser, Debug)]
#[command(
    name = "ridewise",
    version,
    about = "Commuter rail ridership dashboard",
    long_about = "Visualises daily and hourly ridership tables (CSV, JSON or Parquet) and\n\
                  suggests travel times for tourists and workers.\n\
                  \n\
                  Examples:\n\
                    ridewise                                   # Open the dashboard\n\
                    ridewise --daily d.csv --hourly h.parquet  # Custom inputs\n\
                    ridewise report --role worker --json       # Print the pass as JSON\n\
                  \n\
                  Environment Variables:\n\
                    RIDEWISE_DAILY                             # Daily table path\n\
                    RIDEWISE_HOURLY                            # Hourly table path\n\
                    RUST_LOG                                   # Log filter (e.g. info, ridewise=debug)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Daily ridership table (needs a `date` column)
    #[arg(long, env = "RIDEWISE_DAILY", default_value = DEFAULT_DAILY)]
    pub daily: PathBuf,

    /// Hourly ridership table (needs `time` or `hour`, `day_type`, `line_tag`)
    #[arg(long, env = "RIDEWISE_HOURLY", default_value = DEFAULT_HOURLY)]
    pub hourly: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Open the interactive dashboard (default)
    Gui,
    /// Run one pass over the inputs and print the results
    Report(ReportArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ReportArgs {
    /// Recommendation role: tourist or worker
    #[arg(long, default_value = "tourist")]
    pub role: Role,

    /// Day type (default: first in the data)
    #[arg(long)]
    pub day_type: Option<String>,

    /// Line (default: first in the data)
    #[arg(long)]
    pub line: Option<String>,

    /// Range start, YYYY-MM-DD (default: earliest daily date)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Range end, YYYY-MM-DD (default: latest daily date)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Output the series as JSON
    #[arg(long)]
    pub json: bool,
}

/// Where the two input tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub daily: PathBuf,
    pub hourly: PathBuf,
}

impl Cli {
    pub fn sources(&self) -> Sources {
        Sources {
            daily: self.daily.clone(),
            hourly: self.hourly.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ridewise"]).unwrap();
        assert!(cli.mode.is_none());
        assert_eq!(cli.sources().daily, PathBuf::from(DEFAULT_DAILY));
    }

    #[test]
    fn test_report_arguments() {
        let cli = Cli::try_parse_from([
            "ridewise",
            "--hourly",
            "h.parquet",
            "report",
            "--role",
            "worker",
            "--from",
            "2024-01-01",
            "--line",
            "Seremban",
        ])
        .unwrap();
        assert_eq!(cli.hourly, PathBuf::from("h.parquet"));
        let Some(Mode::Report(args)) = cli.mode else {
            panic!("expected report mode");
        };
        assert_eq!(args.role, Role::Worker);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.line.as_deref(), Some("Seremban"));
        assert!(!args.json);
    }

    #[test]
    fn test_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["ridewise", "report", "--role", "pilot"]).is_err());
    }
}
