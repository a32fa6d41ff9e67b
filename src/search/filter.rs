//! Structured filters and their evaluation against a result set.
//!
//! Filters are a map from filter key to a [`FilterValue`]. Keys combine with
//! logical AND; the values selected for a single key combine with logical OR.
//! An absent or empty value never excludes anything, and unknown keys are
//! ignored so that new UI filters do not break older engines.
//!
//! Supported keys:
//!
//! | key         | predicate                                                  |
//! |-------------|------------------------------------------------------------|
//! | `type`      | item type is one of the selected types                    |
//! | `language`  | item language is one of the selected languages            |
//! | `category`  | item shares at least one category with the selection      |
//! | `author`    | case-insensitive substring of the item author             |
//! | `dateRange` | `last_week`, `last_month`, `last_year` or `{start, end}`  |
//!
//! Date ranges are inclusive at both ends. Items with neither `publishedAt`
//! nor `createdAt` never satisfy an active date range.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Category, ContentType, Language, ResultItem};
use crate::util::clock::{SharedClock, SystemClock};

pub const KEY_TYPE: &str = "type";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_CATEGORY: &str = "category";
pub const KEY_AUTHOR: &str = "author";
pub const KEY_DATE_RANGE: &str = "dateRange";

/// Value selected for one filter key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A single value, e.g. an author name or a named date window.
    One(String),
    /// A set of selected values.
    Many(Vec<String>),
    /// An explicit date range. Either end may be open.
    Range {
        #[serde(default)]
        start: Option<DateTime<Utc>>,
        #[serde(default)]
        end: Option<DateTime<Utc>>,
    },
}

impl FilterValue {
    /// Non-blank textual values, trimmed.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(value) => {
                let value = value.trim();
                if value.is_empty() { vec![] } else { vec![value] }
            }
            FilterValue::Many(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect(),
            FilterValue::Range { .. } => vec![],
        }
    }

    /// Whether this value selects nothing and so filters nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Range { start, end } => start.is_none() && end.is_none(),
            _ => self.values().is_empty(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::One(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::One(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// The filter map attached to a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchFilters(BTreeMap<String, FilterValue>);

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `key`, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set an explicit date range.
    pub fn with_date_range(
        self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.with(KEY_DATE_RANGE, FilterValue::Range { start, end })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    /// Whether no key carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(FilterValue::is_empty)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, FilterValue)> for SearchFilters {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A filter key resolved into a predicate over items.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Types(BTreeSet<ContentType>),
    Languages(BTreeSet<Language>),
    Categories(BTreeSet<Category>),
    Authors(Vec<String>),
    Window {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl Predicate {
    fn matches(&self, item: &ResultItem) -> bool {
        match self {
            Predicate::Types(types) => types.contains(&item.content_type),
            Predicate::Languages(languages) => languages.contains(&item.language),
            Predicate::Categories(categories) => {
                !categories.is_disjoint(&item.categories)
            }
            Predicate::Authors(needles) => {
                let author = item.author.to_lowercase();
                needles.iter().any(|needle| author.contains(needle.as_str()))
            }
            Predicate::Window { start, end } => match item.timestamp() {
                Some(ts) => {
                    start.is_none_or(|start| ts >= start) && end.is_none_or(|end| ts <= end)
                }
                None => false,
            },
        }
    }
}

/// Evaluates [`SearchFilters`] against result items.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    clock: SharedClock,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(std::sync::Arc::new(SystemClock))
    }
}

impl FilterEngine {
    /// Create a filter engine resolving relative date windows against `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Keep only the items that satisfy every filter.
    pub fn apply(&self, mut items: Vec<ResultItem>, filters: &SearchFilters) -> Vec<ResultItem> {
        let predicates = self.compile(filters);
        if predicates.is_empty() {
            return items;
        }

        items.retain(|item| predicates.iter().all(|p| p.matches(item)));
        items
    }

    fn compile(&self, filters: &SearchFilters) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        for (key, value) in filters.iter() {
            if value.is_empty() {
                continue;
            }

            let predicate = match key.as_str() {
                KEY_TYPE => Some(Predicate::Types(parse_set(key, value))),
                KEY_LANGUAGE => Some(Predicate::Languages(parse_set(key, value))),
                KEY_CATEGORY => Some(Predicate::Categories(parse_set(key, value))),
                KEY_AUTHOR => Some(Predicate::Authors(
                    value.values().into_iter().map(str::to_lowercase).collect(),
                )),
                KEY_DATE_RANGE => self.date_window(value),
                _ => {
                    log::trace!("ignoring unknown filter key '{key}'");
                    None
                }
            };

            predicates.extend(predicate);
        }

        predicates
    }

    fn date_window(&self, value: &FilterValue) -> Option<Predicate> {
        match value {
            FilterValue::Range { start, end } => Some(Predicate::Window {
                start: *start,
                end: *end,
            }),
            FilterValue::One(name) => {
                let now = self.clock.now();
                let start = match name.trim().to_ascii_lowercase().as_str() {
                    "last_week" => now - Duration::days(7),
                    "last_month" => now.checked_sub_months(Months::new(1))?,
                    "last_year" => now.checked_sub_months(Months::new(12))?,
                    other => {
                        log::debug!("ignoring unknown date window '{other}'");
                        return None;
                    }
                };
                Some(Predicate::Window {
                    start: Some(start),
                    end: Some(now),
                })
            }
            FilterValue::Many(_) => {
                log::debug!("ignoring multi-valued dateRange filter");
                None
            }
        }
    }
}

/// Parse the selected values of a set filter. Values that do not name a
/// known variant cannot match any item and are dropped, so a selection made
/// up only of unknown values matches nothing.
fn parse_set<T: FromStr + Ord>(key: &str, value: &FilterValue) -> BTreeSet<T> {
    value
        .values()
        .into_iter()
        .filter_map(|raw| match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                log::debug!("filter '{key}' has unknown value '{raw}'");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn engine() -> FilterEngine {
        FilterEngine::new(Arc::new(ManualClock::new(now())))
    }

    fn fixture() -> Vec<ResultItem> {
        vec![
            ResultItem::builder("1", "Arabic article")
                .content_type(ContentType::Article)
                .language(Language::Ar)
                .category(Category::Politics)
                .author("Huda Saleh")
                .published_at(now() - Duration::days(2))
                .build(),
            ResultItem::builder("2", "English news")
                .content_type(ContentType::News)
                .language(Language::En)
                .category(Category::Economics)
                .author("John Smith")
                .published_at(now() - Duration::days(20))
                .build(),
            ResultItem::builder("3", "Arabic news")
                .content_type(ContentType::News)
                .language(Language::Ar)
                .category(Category::Economics)
                .category(Category::Politics)
                .author("Omar Haddad")
                .created_at(now() - Duration::days(200))
                .build(),
            ResultItem::builder("4", "Arabic research")
                .content_type(ContentType::Research)
                .language(Language::Ar)
                .category(Category::History)
                .author("huda khalil")
                .build(),
        ]
    }

    fn ids(items: &[ResultItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_and_across_keys_or_within_key() {
        let filters = SearchFilters::new()
            .with(KEY_TYPE, vec!["article", "news"])
            .with(KEY_LANGUAGE, "ar");

        let result = engine().apply(fixture(), &filters);
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn test_empty_value_is_noop() {
        let all = engine().apply(fixture(), &SearchFilters::new());
        let empty = engine().apply(
            fixture(),
            &SearchFilters::new()
                .with(KEY_TYPE, Vec::<String>::new())
                .with(KEY_AUTHOR, "  ")
                .with_date_range(None, None),
        );
        assert_eq!(ids(&all), ids(&empty));
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let filters = SearchFilters::new().with("colour", "blue");
        assert_eq!(engine().apply(fixture(), &filters).len(), 4);
    }

    #[test]
    fn test_unknown_values_match_nothing() {
        let filters = SearchFilters::new().with(KEY_TYPE, "podcast");
        assert!(engine().apply(fixture(), &filters).is_empty());

        let mixed = SearchFilters::new().with(KEY_TYPE, vec!["podcast", "research"]);
        assert_eq!(ids(&engine().apply(fixture(), &mixed)), vec!["4"]);
    }

    #[test]
    fn test_category_intersection() {
        let filters = SearchFilters::new().with(KEY_CATEGORY, vec!["politics", "history"]);
        assert_eq!(ids(&engine().apply(fixture(), &filters)), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_author_case_insensitive_substring() {
        let filters = SearchFilters::new().with(KEY_AUTHOR, "HUDA");
        assert_eq!(ids(&engine().apply(fixture(), &filters)), vec!["1", "4"]);
    }

    #[test]
    fn test_named_date_windows() {
        let week = SearchFilters::new().with(KEY_DATE_RANGE, "last_week");
        assert_eq!(ids(&engine().apply(fixture(), &week)), vec!["1"]);

        let month = SearchFilters::new().with(KEY_DATE_RANGE, "last_month");
        assert_eq!(ids(&engine().apply(fixture(), &month)), vec!["1", "2"]);

        let year = SearchFilters::new().with(KEY_DATE_RANGE, "last_year");
        assert_eq!(ids(&engine().apply(fixture(), &year)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_explicit_range_is_inclusive() {
        let edge = now() - Duration::days(20);
        let filters = SearchFilters::new().with_date_range(Some(edge), Some(edge));
        assert_eq!(ids(&engine().apply(fixture(), &filters)), vec!["2"]);

        let open_end = SearchFilters::new().with_date_range(Some(edge), None);
        assert_eq!(ids(&engine().apply(fixture(), &open_end)), vec!["1", "2"]);
    }

    #[test]
    fn test_filter_value_json_shapes() {
        let json = r#"{
            "type": ["article", "news"],
            "author": "smith",
            "dateRange": {"start": "2024-01-01T00:00:00Z", "end": "2024-02-01T00:00:00Z"}
        }"#;
        let filters: SearchFilters = serde_json::from_str(json).unwrap();
        assert_eq!(
            filters.get(KEY_TYPE),
            Some(&FilterValue::Many(vec!["article".into(), "news".into()]))
        );
        assert_eq!(filters.get(KEY_AUTHOR), Some(&FilterValue::One("smith".into())));
        assert!(matches!(
            filters.get(KEY_DATE_RANGE),
            Some(FilterValue::Range { start: Some(_), end: Some(_) })
        ));
    }
}
