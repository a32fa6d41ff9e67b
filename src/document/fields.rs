//! Closed vocabularies attached to result items.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FedSearchError;

/// Kind of content an item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Research,
    News,
    Event,
    Publication,
}

/// Language an item is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Ar,
    En,
}

/// Editorial category. Items may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Politics,
    Economics,
    Society,
    Culture,
    History,
    Philosophy,
    InternationalRelations,
    Technology,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Article,
        ContentType::Research,
        ContentType::News,
        ContentType::Event,
        ContentType::Publication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Research => "research",
            ContentType::News => "news",
            ContentType::Event => "event",
            ContentType::Publication => "publication",
        }
    }
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Politics,
        Category::Economics,
        Category::Society,
        Category::Culture,
        Category::History,
        Category::Philosophy,
        Category::InternationalRelations,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Economics => "economics",
            Category::Society => "society",
            Category::Culture => "culture",
            Category::History => "history",
            Category::Philosophy => "philosophy",
            Category::InternationalRelations => "international_relations",
            Category::Technology => "technology",
        }
    }
}

impl FromStr for ContentType {
    type Err = FedSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FedSearchError::invalid_argument(format!("unknown content type: {s}")))
    }
}

impl FromStr for Language {
    type Err = FedSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Language::Ar),
            "en" => Ok(Language::En),
            other => Err(FedSearchError::invalid_argument(format!(
                "unknown language: {other}"
            ))),
        }
    }
}

impl FromStr for Category {
    type Err = FedSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FedSearchError::invalid_argument(format!("unknown category: {s}")))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
