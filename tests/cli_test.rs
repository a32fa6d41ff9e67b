use std::fs;

use clap::Parser;
use tokio_test::{assert_err, assert_ok};

use fedsearch::cli::args::FedSearchArgs;
use fedsearch::cli::commands::execute_command;
use fedsearch::error::FedSearchError;

const ARTICLES: &str = r#"[
    {"id": "a1", "title": "Political Theory in the Gulf", "type": "article", "language": "en",
     "publishedAt": "2024-01-10T00:00:00Z"},
    {"id": "a2", "title": "Modern Political Theory", "type": "article", "language": "en",
     "publishedAt": "2024-03-05T00:00:00Z"}
]"#;

const RESEARCH: &str = concat!(
    r#"{"id": "r1", "title": "Foundations of political theory", "type": "research", "language": "ar", "categories": ["philosophy"]}"#,
    "\n",
    r#"{"id": "r2", "title": "Arab economies", "type": "research", "language": "ar", "categories": ["economics"]}"#,
    "\n",
);

#[tokio::test]
async fn test_search_and_analytics_commands() {
    let dir = tempfile::tempdir().unwrap();
    let articles = dir.path().join("articles.json");
    let research = dir.path().join("research.jsonl");
    fs::write(&articles, ARTICLES).unwrap();
    fs::write(&research, RESEARCH).unwrap();

    let articles = articles.to_str().unwrap();
    let research = research.to_str().unwrap();

    let args = FedSearchArgs::try_parse_from([
        "fedsearch", "--format", "json", "search", "political theory", "-s", articles, "-s",
        research, "--sort", "date_desc", "--limit", "2", "--repeat", "2",
    ])
    .unwrap();
    assert_ok!(execute_command(args).await);

    let args = FedSearchArgs::try_parse_from([
        "fedsearch", "analytics", "-s", articles, "--query", "political theory", "--query",
        "economy",
    ])
    .unwrap();
    assert_ok!(execute_command(args).await);
}

#[tokio::test]
async fn test_missing_fixture_fails() {
    let args = FedSearchArgs::try_parse_from([
        "fedsearch", "search", "economy", "-s", "/nonexistent/articles.json",
    ])
    .unwrap();
    let err = assert_err!(execute_command(args).await);
    assert!(matches!(err, FedSearchError::Io(_)));
}

#[tokio::test]
async fn test_config_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("engine.json");
    let articles = dir.path().join("articles.json");
    fs::write(&config, r#"{"search": {"max_limit": 0}}"#).unwrap();
    fs::write(&articles, ARTICLES).unwrap();

    let args = FedSearchArgs::try_parse_from([
        "fedsearch",
        "--config",
        config.to_str().unwrap(),
        "search",
        "political theory",
        "-s",
        articles.to_str().unwrap(),
    ])
    .unwrap();
    let err = assert_err!(execute_command(args).await);
    assert!(matches!(err, FedSearchError::Config(_)));
}
