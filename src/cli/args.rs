//! Command line argument parsing for the fedsearch CLI using clap.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{FedSearchError, Result};
use crate::search::filter::{
    FilterValue, KEY_AUTHOR, KEY_CATEGORY, KEY_DATE_RANGE, KEY_LANGUAGE, KEY_TYPE, SearchFilters,
};
use crate::search::ranking::SortStrategy;

/// fedsearch - federated search across independent content sources
#[derive(Parser, Debug, Clone)]
#[command(name = "fedsearch")]
#[command(about = "Search several content sources at once, with filtering, ranking and caching")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct FedSearchArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "FEDSEARCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl FedSearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search fixture-backed sources
    Search(SearchArgs),

    /// Run several queries and report the collected analytics
    Analytics(AnalyticsArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Fixture file (JSON array or JSON Lines) backing one source; repeatable
    #[arg(short, long = "source", value_name = "FILE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Content types to keep (article, research, news, event, publication)
    #[arg(long = "type", value_name = "TYPE", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Languages to keep (ar, en)
    #[arg(long = "language", value_name = "LANG", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Categories to keep
    #[arg(long = "category", value_name = "CATEGORY", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Author name, matched as a case-insensitive substring
    #[arg(long)]
    pub author: Option<String>,

    /// last_week, last_month, last_year, or START..END (RFC 3339 or YYYY-MM-DD)
    #[arg(long = "date-range", value_name = "RANGE")]
    pub date_range: Option<String>,

    /// Result ordering
    #[arg(long, default_value = "relevance")]
    pub sort: SortStrategy,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Results per page
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Deadline for the whole fan-out, in milliseconds
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Run the search this many times (later runs are served from cache)
    #[arg(long, default_value = "1")]
    pub repeat: usize,
}

impl SearchArgs {
    /// Assemble the filter map from the filter flags.
    pub fn filters(&self) -> Result<SearchFilters> {
        let mut filters = SearchFilters::new();
        if !self.types.is_empty() {
            filters.insert(KEY_TYPE, self.types.clone());
        }
        if !self.languages.is_empty() {
            filters.insert(KEY_LANGUAGE, self.languages.clone());
        }
        if !self.categories.is_empty() {
            filters.insert(KEY_CATEGORY, self.categories.clone());
        }
        if let Some(author) = &self.author {
            filters.insert(KEY_AUTHOR, author.as_str());
        }
        if let Some(range) = &self.date_range {
            filters.insert(KEY_DATE_RANGE, parse_date_range(range)?);
        }
        Ok(filters)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Arguments for the analytics report
#[derive(Parser, Debug, Clone)]
pub struct AnalyticsArgs {
    /// Fixture file backing one source; repeatable
    #[arg(short, long = "source", value_name = "FILE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Query to run; repeatable
    #[arg(long = "query", value_name = "QUERY", required = true)]
    pub queries: Vec<String>,

    /// Number of top terms to report
    #[arg(long, default_value = "10")]
    pub top: usize,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Parse a `--date-range` value into a filter value.
///
/// `START..END` yields an explicit range where either side may be empty;
/// anything else is passed through as a named window.
pub fn parse_date_range(value: &str) -> Result<FilterValue> {
    let Some((start, end)) = value.split_once("..") else {
        return Ok(FilterValue::One(value.trim().to_string()));
    };
    let start = parse_bound(start, NaiveTime::MIN)?;
    let end = parse_bound(end, NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))?;
    Ok(FilterValue::Range { start, end })
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<Option<DateTime<Utc>>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| Some(date.and_time(time_of_day).and_utc()))
        .map_err(|e| FedSearchError::invalid_argument(format!("invalid date '{value}': {e}")))
}
