//! Search pipeline orchestration.
//!
//! The pipeline operates entirely through the [`SearchIndex`] and
//! [`DocketStore`] traits, with no engine or database dependencies. The
//! calling application constructs the clients and passes them in.
//!
//! # Fresh search (`refreshResults = true`)
//!
//! 1. Invalidate any stored results for the request fingerprint.
//! 2. Aggregate per-docket match counts across every searchable field.
//! 3. Enrich with relational fields (five passes, untitled dockets dropped).
//! 4. Score and order the full candidate set; assign ranks.
//! 5. Persist the first 100 rows under the fingerprint.
//! 6. Slice the requested page.
//!
//! # Repeat request (`refreshResults = false`)
//!
//! 1. Fetch stored rows for the fingerprint, in rank order.
//! 2. Rebuild dockets from the persisted rank/score/count columns.
//! 3. Re-attach presentation fields with the same enrichment passes.
//! 4. Slice the requested page.
//!
//! Stored-result writes are best-effort (a failure is logged and the
//! response still goes out); the fetch on the repeat path is the only data
//! source for that request, so its failure is fatal.

use chrono::Utc;

use crate::aggregate::collect_matches;
use crate::enrich::enrich;
use crate::error::Result;
use crate::index::SearchIndex;
use crate::models::{EnrichedDocket, QueryFingerprint, SearchRequest, SearchResponse};
use crate::page::{page_slice, total_pages, MAX_PAGES, PAGE_SIZE};
use crate::rank::{order_and_rank, score_all};
use crate::store::DocketStore;

/// Maximum rows persisted per fingerprint.
pub const STORED_RESULT_LIMIT: usize = PAGE_SIZE * MAX_PAGES;

/// Run a docket search end to end.
///
/// An empty stored-result set on the repeat path yields an empty page; it
/// never falls back to a fresh search the caller did not ask for.
pub async fn search<I, S>(index: &I, store: &S, request: &SearchRequest) -> Result<SearchResponse>
where
    I: SearchIndex,
    S: DocketStore,
{
    let fingerprint = QueryFingerprint::from_request(request);
    if request.refresh_results {
        fresh_search(index, store, request, &fingerprint).await
    } else {
        cached_search(store, request, &fingerprint).await
    }
}

async fn fresh_search<I: SearchIndex, S: DocketStore>(
    index: &I,
    store: &S,
    request: &SearchRequest,
    fingerprint: &QueryFingerprint,
) -> Result<SearchResponse> {
    if let Err(e) = store.invalidate_results(fingerprint).await {
        tracing::warn!("failed to invalidate stored results: {}", e);
    }

    let matches = collect_matches(index, &request.search_term).await?;
    tracing::debug!(candidates = matches.len(), "aggregated match counts");

    let seeds: Vec<EnrichedDocket> = matches.into_iter().map(EnrichedDocket::from_match).collect();
    let mut dockets = enrich(store, seeds).await?;

    score_all(&mut dockets, Utc::now());
    order_and_rank(&mut dockets);

    if let Err(e) = store
        .store_results(fingerprint, &dockets, STORED_RESULT_LIMIT)
        .await
    {
        tracing::warn!("failed to persist results: {}", e);
    }

    tracing::info!(
        term = %request.search_term,
        results = dockets.len(),
        "fresh search complete"
    );
    Ok(SearchResponse {
        current_page: request.page_number,
        total_pages: total_pages(dockets.len()),
        dockets: page_slice(&dockets, request.page_number),
    })
}

async fn cached_search<S: DocketStore>(
    store: &S,
    request: &SearchRequest,
    fingerprint: &QueryFingerprint,
) -> Result<SearchResponse> {
    let rows = store.fetch_results(fingerprint).await?;
    tracing::debug!(rows = rows.len(), "fetched stored results");

    let seeds: Vec<EnrichedDocket> = rows.iter().map(EnrichedDocket::from_cached).collect();
    let dockets = enrich(store, seeds).await?;

    Ok(SearchResponse {
        current_page: request.page_number,
        total_pages: total_pages(dockets.len()),
        dockets: page_slice(&dockets, request.page_number),
    })
}
