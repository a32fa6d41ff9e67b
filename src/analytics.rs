//! Rolling usage analytics: popular terms, response times and recent history.
//!
//! Analytics live in memory for the life of the process. Only successful,
//! non-cached searches are recorded.

pub mod collector;
pub mod config;
pub mod history;

pub use collector::{AnalyticsSnapshot, SearchAnalytics, TermCount};
pub use config::AnalyticsConfig;
pub use history::{HistoryEntry, SearchHistory};
