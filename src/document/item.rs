//! The result item produced by content sources.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::fields::{Category, ContentType, Language};

/// One matched entity returned by a content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// Identifier, unique within the producing source.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Body text or excerpt.
    #[serde(default, alias = "excerpt")]
    pub body: String,

    /// Author display name.
    #[serde(default)]
    pub author: String,

    /// Kind of content.
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Language of the content.
    pub language: Language,

    /// Editorial categories.
    #[serde(default)]
    pub categories: BTreeSet<Category>,

    /// Publication timestamp, if published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Source-supplied relevance score. Only consulted by relevance ordering.
    #[serde(default)]
    pub relevance_score: f64,

    /// Identifier of the source that produced this item. Filled in by the
    /// federator, so sources may leave it empty.
    #[serde(default)]
    pub source_id: String,
}

impl ResultItem {
    /// Start building an item.
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> ResultItemBuilder {
        ResultItemBuilder::new(id, title)
    }

    /// The timestamp used for date filtering and ordering: `published_at`,
    /// falling back to `created_at`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    /// Key identifying this item across all sources.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.source_id.as_str(), self.id.as_str())
    }
}

/// Builder for [`ResultItem`].
#[derive(Debug, Clone)]
pub struct ResultItemBuilder {
    item: ResultItem,
}

impl ResultItemBuilder {
    fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            item: ResultItem {
                id: id.into(),
                title: title.into(),
                body: String::new(),
                author: String::new(),
                content_type: ContentType::Article,
                language: Language::En,
                categories: BTreeSet::new(),
                published_at: None,
                created_at: None,
                relevance_score: 0.0,
                source_id: String::new(),
            },
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.item.body = body.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.item.author = author.into();
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.item.content_type = content_type;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.item.language = language;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.item.categories.insert(category);
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.item.published_at = Some(at);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.item.created_at = Some(at);
        self
    }

    pub fn relevance_score(mut self, score: f64) -> Self {
        self.item.relevance_score = score;
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.item.source_id = source_id.into();
        self
    }

    pub fn build(self) -> ResultItem {
        self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_prefers_published_at() {
        let created = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let published = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();

        let item = ResultItem::builder("1", "t")
            .created_at(created)
            .published_at(published)
            .build();
        assert_eq!(item.timestamp(), Some(published));

        let draft = ResultItem::builder("2", "t").created_at(created).build();
        assert_eq!(draft.timestamp(), Some(created));

        let undated = ResultItem::builder("3", "t").build();
        assert_eq!(undated.timestamp(), None);
    }

    #[test]
    fn test_json_field_names() {
        let item = ResultItem::builder("42", "Political theory")
            .content_type(ContentType::Research)
            .language(Language::Ar)
            .category(Category::Politics)
            .relevance_score(0.5)
            .source_id("articles")
            .build();

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "research");
        assert_eq!(value["language"], "ar");
        assert_eq!(value["relevanceScore"], 0.5);
        assert_eq!(value["sourceId"], "articles");
        assert_eq!(value["categories"][0], "politics");
        assert!(value.get("publishedAt").is_none());
    }

    #[test]
    fn test_deserialize_with_excerpt_alias() {
        let json = r#"{
            "id": "7",
            "title": "Event",
            "excerpt": "short text",
            "type": "event",
            "language": "en",
            "publishedAt": "2024-03-01T10:00:00Z"
        }"#;
        let item: ResultItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.body, "short text");
        assert_eq!(item.content_type, ContentType::Event);
        assert!(item.categories.is_empty());
        assert_eq!(item.source_id, "");
        assert!(item.published_at.is_some());
    }
}
