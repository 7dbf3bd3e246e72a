//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone};
use clap::{Parser, Subcommand};
use meetcoach_core::DateRange;

use crate::error::{ClientError, ClientResult};

/// meetcoach - Daily coaching feedback from your meeting transcripts
#[derive(Debug, Parser)]
#[command(name = "meetcoach")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETCOACH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Date range ---
    /// Analyze the last N days
    #[arg(long, conflicts_with = "start", value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// First day to analyze (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Last day to analyze (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    // --- Run options ---
    /// Only analyze meetings that were not analyzed before
    #[arg(long)]
    pub new_only: bool,

    /// Do not email the report
    #[arg(long)]
    pub no_email: bool,

    /// Send a test email and exit
    #[arg(long)]
    pub test_email: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the date range selected by the flags, relative to `now`.
    ///
    /// Without range flags the range is today.
    pub fn date_range<Tz: TimeZone>(&self, now: DateTime<Tz>) -> ClientResult<DateRange> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            return DateRange::between(start, end, &now.timezone()).ok_or_else(|| {
                ClientError::InvalidArguments(format!(
                    "--start {} is after --end {}",
                    start, end
                ))
            });
        }

        Ok(match self.days {
            Some(days) => DateRange::last_days(days, now),
            None => DateRange::today(now),
        })
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("meetcoach").chain(args.iter().copied()))
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 5, 18, 30, 0)
            .unwrap()
    }

    #[test]
    fn defaults_to_today() {
        let cli = parse(&[]).unwrap();
        assert!(!cli.new_only && !cli.no_email && !cli.test_email);
        let range = cli.date_range(now()).unwrap();
        assert_eq!(range.label, "Today (2025-03-05)");
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 3, 4, 23, 0, 0).unwrap());
    }

    #[test]
    fn days_selects_last_n_days() {
        let cli = parse(&["--days", "7", "--new-only", "--no-email"]).unwrap();
        assert!(cli.new_only && cli.no_email);
        let range = cli.date_range(now()).unwrap();
        assert_eq!(range.label, "Last 7 day(s)");
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 2, 26, 17, 30, 0).unwrap());
    }

    #[test]
    fn explicit_range() {
        let cli = parse(&["--start", "2025-03-01", "--end", "2025-03-03"]).unwrap();
        let range = cli.date_range(now()).unwrap();
        assert_eq!(range.label, "2025-03-01 to 2025-03-03");
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 3, 3, 22, 59, 59).unwrap());
    }

    #[test]
    fn start_after_end_is_rejected() {
        let cli = parse(&["--start", "2025-03-04", "--end", "2025-03-01"]).unwrap();
        let err = cli.date_range(now()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArguments(_)));
    }

    #[test]
    fn invalid_combinations_fail_to_parse() {
        let err = parse(&["--start", "2025-03-01"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["--end", "2025-03-01"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["--days", "3", "--start", "2025-03-01", "--end", "2025-03-02"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        assert!(parse(&["--days", "0"]).is_err());
        assert!(parse(&["--start", "03/01/2025", "--end", "2025-03-02"]).is_err());
    }

    #[test]
    fn config_subcommand() {
        let cli = parse(&["config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }
}
