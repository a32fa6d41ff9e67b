//! Result ordering strategies.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::ResultItem;
use crate::error::FedSearchError;
use crate::search::collation::CollationKey;

/// Named ordering applied to a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortStrategy {
    /// Descending source-supplied relevance score.
    #[default]
    Relevance,
    /// Newest first.
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Alphabetical by title.
    Title,
}

impl SortStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::Relevance => "relevance",
            SortStrategy::DateDesc => "date_desc",
            SortStrategy::DateAsc => "date_asc",
            SortStrategy::Title => "title",
        }
    }

    /// Parse a strategy name, falling back to [`SortStrategy::Relevance`]
    /// for anything unrecognized.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::debug!("unknown sort strategy '{name}', using relevance");
            SortStrategy::Relevance
        })
    }
}

impl FromStr for SortStrategy {
    type Err = FedSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortStrategy::Relevance),
            "date_desc" | "date" | "newest" => Ok(SortStrategy::DateDesc),
            "date_asc" | "oldest" => Ok(SortStrategy::DateAsc),
            "title" => Ok(SortStrategy::Title),
            other => Err(FedSearchError::invalid_argument(format!(
                "unknown sort strategy: {other}"
            ))),
        }
    }
}

impl From<String> for SortStrategy {
    fn from(name: String) -> Self {
        SortStrategy::parse_lenient(&name)
    }
}

impl From<SortStrategy> for String {
    fn from(strategy: SortStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders result sets. Sorting is stable and never mutates its input, so it
/// is safe to run against cached data.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Return a newly ordered copy of `items`.
    pub fn sort(&self, items: &[ResultItem], strategy: SortStrategy) -> Vec<ResultItem> {
        self.sort_owned(items.to_vec(), strategy)
    }

    /// Order `items` in place and hand them back.
    pub fn sort_owned(&self, mut items: Vec<ResultItem>, strategy: SortStrategy) -> Vec<ResultItem> {
        match strategy {
            SortStrategy::Relevance => {
                items.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
            }
            SortStrategy::DateDesc => items.sort_by(|a, b| by_date(a, b, true)),
            SortStrategy::DateAsc => items.sort_by(|a, b| by_date(a, b, false)),
            SortStrategy::Title => items.sort_by_cached_key(|item| CollationKey::new(&item.title)),
        }
        items
    }
}

/// Undated items sort last in both directions.
fn by_date(a: &ResultItem, b: &ResultItem, descending: bool) -> Ordering {
    match (a.timestamp(), b.timestamp()) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
