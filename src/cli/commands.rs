//! Command implementations for the fedsearch CLI.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::federation::context::SearchContext;
use crate::orchestrator::{EngineConfig, SearchOrchestrator};
use crate::search::request::SearchParams;
use crate::source::loader::load_source;

/// Execute a CLI command.
pub async fn execute_command(args: FedSearchArgs) -> Result<()> {
    let orchestrator = build_orchestrator(&args, command_sources(&args.command))?;
    orchestrator.start_cache_sweeper();

    let result = match &args.command {
        Command::Search(search_args) => run_search(&orchestrator, search_args, &args).await,
        Command::Analytics(analytics_args) => {
            run_analytics(&orchestrator, analytics_args, &args).await
        }
    };

    orchestrator.shutdown().await;
    result
}

fn command_sources(command: &Command) -> &[PathBuf] {
    match command {
        Command::Search(search_args) => &search_args.sources,
        Command::Analytics(analytics_args) => &analytics_args.sources,
    }
}

/// Load the engine configuration and register one source per fixture file.
fn build_orchestrator(args: &FedSearchArgs, sources: &[PathBuf]) -> Result<SearchOrchestrator> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    let orchestrator = SearchOrchestrator::new(config);
    for path in sources {
        let source = load_source(path, None)?;
        orchestrator.register_source(Arc::new(source))?;
    }
    log::info!("registered sources: {}", orchestrator.source_ids().join(", "));
    Ok(orchestrator)
}

/// Run a search, optionally several times to exercise the cache.
async fn run_search(
    orchestrator: &SearchOrchestrator,
    args: &SearchArgs,
    cli_args: &FedSearchArgs,
) -> Result<()> {
    let params = SearchParams::new(args.query.clone())
        .filters(args.filters()?)
        .sort(args.sort)
        .page(args.page)
        .limit(args.limit);

    let mut runs = Vec::new();
    let mut last = None;
    for run in 1..=args.repeat.max(1) {
        let ctx = match args.timeout() {
            Some(timeout) => SearchContext::with_timeout(timeout),
            None => SearchContext::new(),
        };
        let response = orchestrator
            .search_with_context(params.clone(), &ctx)
            .await
            .inspect_err(|e| eprintln!("{}", e.user_message()))?;
        runs.push(RunSummary {
            run,
            cached: response.cached,
            response_time_ms: response.response_time_ms,
        });
        last = Some(response);
    }

    if let Some(response) = last {
        output_result(
            "Search completed",
            &SearchReport {
                response,
                runs,
                cache_stats: orchestrator.cache_stats(),
                min_query_length: orchestrator.config().search.min_query_length,
            },
            cli_args,
        )?;
    }
    Ok(())
}

/// Run every query and report the analytics they produced.
async fn run_analytics(
    orchestrator: &SearchOrchestrator,
    args: &AnalyticsArgs,
    cli_args: &FedSearchArgs,
) -> Result<()> {
    let mut failures = Vec::new();
    for query in &args.queries {
        if let Err(e) = orchestrator.search(SearchParams::new(query.clone())).await {
            log::warn!("query '{query}' failed: {e}");
            failures.push(format!("{query}: {e}"));
        }
    }

    let mut analytics = orchestrator.get_analytics();
    analytics.top_terms = orchestrator.get_top_terms(args.top);

    output_result(
        "Analytics collected",
        &AnalyticsReport {
            analytics,
            history: orchestrator.get_history(),
            failures,
        },
        cli_args,
    )
}
