//! Output formatting for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::analytics::collector::AnalyticsSnapshot;
use crate::analytics::history::HistoryEntry;
use crate::cache::result_cache::CacheStats;
use crate::cli::args::{FedSearchArgs, OutputFormat};
use crate::error::Result;
use crate::query::normalizer::QueryNormalizer;
use crate::search::filter::FilterValue;
use crate::search::response::SearchResponse;

/// Timing of one run of a repeated search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run: usize,
    pub cached: bool,
    pub response_time_ms: f64,
}

/// Result structure for the search command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    /// Response of the last run.
    #[serde(flatten)]
    pub response: SearchResponse,
    pub runs: Vec<RunSummary>,
    pub cache_stats: CacheStats,
    /// Shortest query the engine searches for; shorter ones get a hint.
    #[serde(skip)]
    pub min_query_length: usize,
}

/// Result structure for the analytics command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub analytics: AnalyticsSnapshot,
    pub history: Vec<HistoryEntry>,
    /// Queries that failed, with the reason.
    pub failures: Vec<String>,
}

/// Plain-text rendering of a command result.
pub trait HumanReadable {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Output a result in the format selected on the command line.
pub fn output_result<T: Serialize + HumanReadable>(
    message: &str,
    result: &T,
    args: &FedSearchArgs,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Write a result to `out` in the selected format.
pub fn write_result<T: Serialize + HumanReadable>(
    out: &mut dyn Write,
    message: &str,
    result: &T,
    args: &FedSearchArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)?;
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

impl HumanReadable for SearchReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        let response = &self.response;
        writeln!(out, "Search Results for \"{}\":", response.query)?;
        writeln!(out, "═══════════════")?;

        if response.total == 0 {
            writeln!(out)?;
            let min = self.min_query_length;
            if QueryNormalizer::length(&response.query) < min {
                writeln!(out, "Type at least {min} characters to search.")?;
            } else {
                writeln!(out, "No results.")?;
            }
        }

        let offset = response.page.saturating_sub(1) * response.limit;
        for (i, item) in response.results.iter().enumerate() {
            writeln!(out)?;
            writeln!(
                out,
                "{}. {} [{} / {}] (Score: {:.3})",
                offset + i + 1,
                item.title,
                item.content_type,
                item.source_id,
                item.relevance_score
            )?;
            if !item.author.is_empty() {
                writeln!(out, "   by {}", item.author)?;
            }
            if let Some(at) = item.timestamp() {
                writeln!(out, "   {}", at.format("%Y-%m-%d"))?;
            }
            if !item.body.is_empty() {
                writeln!(out, "   {}", excerpt(&item.body, 120))?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Page {} of {} ({} total, sorted by {})",
            response.page,
            response.total_pages().max(1),
            response.total,
            response.sort_by
        )?;
        for (key, value) in response.filters.iter() {
            writeln!(out, "Filter {key}: {}", describe_filter(value))?;
        }
        if response.is_partial() {
            let degraded: Vec<_> = response.degraded_sources.iter().map(String::as_str).collect();
            writeln!(out, "Partial results, unavailable sources: {}", degraded.join(", "))?;
        }

        for run in &self.runs {
            writeln!(
                out,
                "Run {}: {:.2} ms{}",
                run.run,
                run.response_time_ms,
                if run.cached { " (cached)" } else { "" }
            )?;
        }
        writeln!(
            out,
            "Cache: {} entries, {} hits, {} misses",
            self.cache_stats.entries, self.cache_stats.hits, self.cache_stats.misses
        )?;
        Ok(())
    }
}

impl HumanReadable for AnalyticsReport {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        let analytics = &self.analytics;
        writeln!(out, "Search Analytics:")?;
        writeln!(out, "════════════════")?;
        writeln!(out, "Total searches: {}", analytics.total_searches)?;
        writeln!(
            out,
            "Average response time: {:.2} ms",
            analytics.average_response_time_ms
        )?;

        if !analytics.top_terms.is_empty() {
            writeln!(out)?;
            writeln!(out, "Top terms:")?;
            writeln!(out, "──────────")?;
            for term in &analytics.top_terms {
                writeln!(out, "  {} ({})", term.term, term.count)?;
            }
        }

        if !analytics.sources.is_empty() {
            writeln!(out)?;
            writeln!(out, "Sources:")?;
            writeln!(out, "────────")?;
            for source in &analytics.sources {
                writeln!(
                    out,
                    "  {}: {} calls, {} ok, {} failed, {} timed out, avg {:.2} ms",
                    source.source_id,
                    source.calls,
                    source.successes,
                    source.failures,
                    source.timeouts,
                    source.avg_response_time_ms
                )?;
            }
        }

        if !self.history.is_empty() {
            writeln!(out)?;
            writeln!(out, "Recent searches:")?;
            writeln!(out, "────────────────")?;
            for entry in &self.history {
                writeln!(
                    out,
                    "  {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.query
                )?;
            }
        }

        for failure in &self.failures {
            writeln!(out, "Failed: {failure}")?;
        }
        Ok(())
    }
}

fn describe_filter(value: &FilterValue) -> String {
    match value {
        FilterValue::Range { start, end } => format!(
            "{}..{}",
            start.map(|s| s.to_rfc3339()).unwrap_or_default(),
            end.map(|e| e.to_rfc3339()).unwrap_or_default()
        ),
        other => other.values().join(", "),
    }
}

/// Shorten `text` to at most `max_chars` characters.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
