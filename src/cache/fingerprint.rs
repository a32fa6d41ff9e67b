//! Canonical request fingerprints.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::search::filter::{FilterValue, SearchFilters};
use crate::search::request::SearchRequest;

/// Canonical string identifying a normalized request.
///
/// Filter keys are sorted, multi-values are trimmed, lowercased, sorted and
/// deduplicated, and empty filters are dropped, so semantically identical
/// requests always share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

#[derive(Serialize)]
#[serde(untagged)]
enum CanonicalValue {
    Values(Vec<String>),
    Range {
        start: Option<String>,
        end: Option<String>,
    },
}

#[derive(Serialize)]
struct CanonicalRequest<'a> {
    query: &'a str,
    filters: BTreeMap<&'a str, CanonicalValue>,
    sort: &'static str,
    page: usize,
    limit: usize,
}

impl Fingerprint {
    /// Fingerprint a prepared request.
    pub fn of(request: &SearchRequest) -> Self {
        Self::from_parts(
            request.normalized_query(),
            request.filters(),
            request.sort().as_str(),
            request.page(),
            request.limit(),
        )
    }

    fn from_parts(
        query: &str,
        filters: &SearchFilters,
        sort: &'static str,
        page: usize,
        limit: usize,
    ) -> Self {
        let filters = filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), canonical_value(value)))
            .collect();

        let canonical = CanonicalRequest {
            query,
            filters,
            sort,
            page,
            limit,
        };

        // Serializing strings, integers and ordered maps cannot fail.
        let encoded = serde_json::to_string(&canonical)
            .unwrap_or_else(|_| format!("{query}|{sort}|{page}|{limit}"));
        Fingerprint(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonical_value(value: &FilterValue) -> CanonicalValue {
    match value {
        FilterValue::Range { start, end } => CanonicalValue::Range {
            start: start.map(|s| s.to_rfc3339()),
            end: end.map(|e| e.to_rfc3339()),
        },
        _ => {
            let mut values: Vec<String> = value
                .values()
                .into_iter()
                .map(str::to_lowercase)
                .collect();
            values.sort();
            values.dedup();
            CanonicalValue::Values(values)
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
