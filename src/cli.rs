//! Command-line interface argument parsing.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// Clean a title catalog export and summarize it.
///
/// Examples:
///   catalog_report clean --input data/titles.csv --output data/titles_cleaned.csv
///   catalog_report report --input data/titles.csv --out visuals --bins 40
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (per-row cleaning decisions)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Normalize the raw export and write the cleaned CSV
    Clean(CleanArgs),
    /// Summarize a raw export or a cleaned CSV into report tables
    Report(ReportArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CleanArgs {
    /// Raw catalog CSV
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Cleaned CSV to write
    #[arg(short, long, value_name = "FILE", default_value = "data/catalog_cleaned.csv")]
    pub output: PathBuf,

    /// Preview CSV holding the first rows of the cleaned table
    #[arg(long, value_name = "FILE", default_value = "data/catalog_cleaned_preview.csv")]
    pub preview: PathBuf,

    /// Rows in the preview file
    #[arg(long, value_name = "COUNT")]
    pub preview_rows: Option<usize>,

    /// TOML file with report sizes
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ReportArgs {
    /// Raw catalog CSV, or a cleaned CSV written by `clean`
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Directory for report files (created if missing)
    #[arg(short, long, value_name = "DIR", default_value = "visuals")]
    pub out: PathBuf,

    /// TOML file with report sizes
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Buckets in the movie duration histogram
    #[arg(long, value_name = "COUNT")]
    pub bins: Option<usize>,

    /// Override every top-N size (genres, countries, directors, ratings)
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_overrides() {
        let cli = Cli::parse_from([
            "catalog_report", "-v", "report", "--input", "raw.csv", "--bins", "40", "--top", "3",
        ]);
        assert_eq!(cli.log_level(), Level::DEBUG);
        let Command::Report(args) = cli.command else { panic!("expected report") };
        assert_eq!(args.input, PathBuf::from("raw.csv"));
        assert_eq!(args.out, PathBuf::from("visuals"));
        assert_eq!(args.bins, Some(40));
        assert_eq!(args.top, Some(3));
    }

    #[test]
    fn clean_defaults() {
        let cli = Cli::parse_from(["catalog_report", "clean", "-i", "raw.csv"]);
        assert_eq!(cli.log_level(), Level::INFO);
        let Command::Clean(args) = cli.command else { panic!("expected clean") };
        assert_eq!(args.output, PathBuf::from("data/catalog_cleaned.csv"));
        assert_eq!(args.preview_rows, None);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["catalog_report", "-v", "-q", "clean", "-i", "x"]).is_err());
    }
}
