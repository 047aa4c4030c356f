//! Application entry points for docket search.
//!
//! The pipeline itself (match aggregation, enrichment, ranking,
//! pagination, stored results) lives in `docket-search-core::search` and
//! operates through the [`SearchIndex`] and [`DocketStore`] traits. This
//! wrapper resolves credentials, builds the owned pool and index client,
//! runs the pipeline, and formats CLI output.
//!
//! [`SearchIndex`]: docket_search_core::index::SearchIndex
//! [`DocketStore`]: docket_search_core::store::DocketStore

use anyhow::Result;
use chrono::DateTime;

#[allow(unused_imports)]
pub use docket_search_core::models::{
    DateRange, EnrichedDocket, FilterParams, SearchRequest, SearchResponse, SortParams, SortType,
};

use crate::config::Config;
use crate::credentials;
use crate::db;
use crate::opensearch::OpenSearchClient;
use crate::pg_store::PgStore;

/// Run one search request against live backends.
///
/// This is the shared implementation behind `dockets search`. Credentials
/// are resolved once, the pool and index client are constructed for this
/// request and torn down afterwards, and the pipeline is delegated to
/// `docket_search_core::search::search` via [`PgStore`].
pub async fn execute_search(config: &Config, request: &SearchRequest) -> Result<SearchResponse> {
    let source = credentials::create_credential_source(config)?;

    let pool = db::connect(config, &source.postgres()?).await?;
    let store = PgStore::new(pool.clone());
    let index = OpenSearchClient::connect(config, &source.opensearch()?).await?;

    let result = docket_search_core::search::search(&index, &store, request).await;

    pool.close().await;
    Ok(result?)
}

/// CLI entry point — calls [`execute_search`] and prints results to stdout.
pub async fn run_search(config: &Config, request: &SearchRequest, json: bool) -> Result<()> {
    let response = execute_search(config, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.dockets.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "Page {} of {} for \"{}\"",
        response.current_page, response.total_pages, request.search_term
    );
    println!();

    for docket in &response.dockets {
        let title = docket.title.as_deref().unwrap_or("(untitled)");
        println!(
            "{}. [{:.3}] {} — {}",
            docket.search_rank + 1,
            docket.relevance_score,
            docket.docket_id,
            title
        );
        if let Some(ref name) = docket.agency_name {
            let id = docket.agency_id.as_deref().unwrap_or("?");
            println!("    agency: {} ({})", name, id);
        }
        println!(
            "    comments: {} matching of {}",
            docket.comments.matched, docket.comments.total
        );
        if let Some(attachments) = docket.attachments {
            println!(
                "    attachments: {} matching of {}",
                attachments.matched, attachments.total
            );
        }
        println!("    documents: {}", docket.document_count);
        if let Some(modified) = docket.timeline_dates.date_modified {
            println!("    modified: {}", modified.format("%Y-%m-%d"));
        }
        println!(
            "    open for comment: {}",
            if docket.is_open_for_comment { "yes" } else { "no" }
        );
        if let Some(ref summary) = docket.summary {
            println!("    summary: \"{}\"", summary.replace('\n', " ").trim());
        }
        println!();
    }

    Ok(())
}

/// Parse a sort-type name from the command line.
pub fn parse_sort_type(s: &str) -> Result<SortType, String> {
    match s {
        "dateModified" => Ok(SortType::DateModified),
        "alphaByTitle" => Ok(SortType::AlphaByTitle),
        "relevance" => Ok(SortType::Relevance),
        other => Err(format!(
            "unknown sort type '{}': use dateModified, alphaByTitle, or relevance",
            other
        )),
    }
}

/// Validate a filter timestamp from the command line. An empty string is
/// an open bound; anything else must be RFC 3339.
pub fn parse_filter_date(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Ok(String::new());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", s, e))
}
