// ⚙️ Configuration - command line arguments resolved into paths and mode

use crate::expense::{parse_date, Category};
use crate::filter::FilterCriteria;
use crate::repository::DEFAULT_STORE_KEY;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const APP_DIR: &str = "budget-tracker";
const DB_FILE: &str = "expenses.db";
const LOG_FILE: &str = "budget-tracker.log";

#[derive(Debug, Parser)]
#[command(name = "budget-tracker", about = "Personal expense tracker", version)]
pub struct Cli {
    /// SQLite database file (defaults to the platform data directory).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Log file (defaults to budget-tracker.log next to the database).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the expense table and the category chart, then exit.
    Report {
        /// Only list expenses in this category.
        #[arg(long, value_parser = parse_category_arg)]
        category: Option<Category>,

        /// Only list expenses on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,

        /// Only list expenses on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Interactive,
    Report(FilterCriteria),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub store_key: String,
    pub mode: Mode,
}

impl Cli {
    pub fn into_config(self) -> Config {
        let db_path = self.db.unwrap_or_else(default_db_path);
        let log_path = self
            .log_file
            .unwrap_or_else(|| db_path.with_file_name(LOG_FILE));

        let mode = match self.command {
            None => Mode::Interactive,
            Some(Command::Report { category, from, to }) => Mode::Report(FilterCriteria {
                category,
                start_date: from,
                end_date: to,
            }),
        };

        Config {
            db_path,
            log_path,
            store_key: DEFAULT_STORE_KEY.to_string(),
            mode,
        }
    }
}

/// Parse the process arguments.
pub fn load() -> Config {
    Cli::parse().into_config()
}

fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR).join(DB_FILE),
        None => PathBuf::from(DB_FILE),
    }
}

fn parse_category_arg(s: &str) -> Result<Category> {
    s.parse::<Category>().map_err(|err| anyhow!(err))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    parse_date(s).ok_or_else(|| anyhow!("expected a YYYY-MM-DD date, got {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_interactive() {
        let config = Cli::try_parse_from(["budget-tracker"]).unwrap().into_config();

        assert_eq!(config.mode, Mode::Interactive);
        assert_eq!(config.store_key, "expenses");
        assert!(config.db_path.ends_with("expenses.db"));
        assert!(config.log_path.ends_with("budget-tracker.log"));
    }

    #[test]
    fn test_explicit_paths() {
        let config = Cli::try_parse_from([
            "budget-tracker",
            "--db",
            "/tmp/bt/data.db",
            "--log-file",
            "/tmp/bt.log",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.db_path, PathBuf::from("/tmp/bt/data.db"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/bt.log"));
    }

    #[test]
    fn test_log_defaults_next_to_db() {
        let config = Cli::try_parse_from(["budget-tracker", "--db", "/tmp/bt/data.db"])
            .unwrap()
            .into_config();

        assert_eq!(config.log_path, PathBuf::from("/tmp/bt/budget-tracker.log"));
    }

    #[test]
    fn test_report_filters() {
        let config = Cli::try_parse_from([
            "budget-tracker",
            "report",
            "--category",
            "transport",
            "--from",
            "2024-01-15",
        ])
        .unwrap()
        .into_config();

        assert_eq!(
            config.mode,
            Mode::Report(FilterCriteria {
                category: Some(Category::Transport),
                start_date: parse_date("2024-01-15"),
                end_date: None,
            })
        );
    }

    #[test]
    fn test_report_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["budget-tracker", "report", "--category", "Rent"]).is_err());
        assert!(Cli::try_parse_from(["budget-tracker", "report", "--to", "soon"]).is_err());
    }
}
