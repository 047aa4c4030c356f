//! Relational-store abstraction.
//!
//! The [`DocketStore`] trait defines every relational lookup the enrichment
//! passes need, plus the stored-result operations backing the result cache,
//! enabling pluggable backends (Postgres in production, in-memory for
//! tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CachedResultRow, EnrichedDocket, QueryFingerprint};

/// Title, modification date, and type for one docket.
#[derive(Debug, Clone)]
pub struct DocketFieldsRow {
    pub docket_id: String,
    pub title: Option<String>,
    pub modify_date: Option<DateTime<Utc>>,
    pub docket_type: Option<String>,
}

/// Agency identity joined through a docket's owning agency.
#[derive(Debug, Clone)]
pub struct AgencyRow {
    pub docket_id: String,
    pub agency_id: String,
    pub agency_name: Option<String>,
}

/// Document count and open-for-comment aggregate for one docket.
#[derive(Debug, Clone)]
pub struct DocumentStatsRow {
    pub docket_id: String,
    pub document_count: i64,
    /// Logical OR across the docket's documents, false when none are flagged.
    pub is_open_for_comment: bool,
}

/// Min/max document dates for one docket.
///
/// Each field is the aggregate over that docket's documents: earliest posted
/// date, earliest comment-open date, latest comment-close date, earliest
/// effective date. A docket with no documents has no row at all.
#[derive(Debug, Clone)]
pub struct DocumentDatesRow {
    pub docket_id: String,
    pub date_posted: Option<DateTime<Utc>>,
    pub comment_start: Option<DateTime<Utc>>,
    pub comment_end: Option<DateTime<Utc>>,
    pub date_effective: Option<DateTime<Utc>>,
}

/// Summary text for one docket, from either source table.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub docket_id: String,
    pub text: String,
}

/// Abstract relational backend for enrichment and stored results.
///
/// Lookup methods take the full candidate id set and return one row per
/// docket that has data, so each enrichment pass costs a single query.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`docket_fields`](DocketStore::docket_fields) | Title, modify date, type per docket |
/// | [`agency_fields`](DocketStore::agency_fields) | Agency id/name via the owning-agency join |
/// | [`document_stats`](DocketStore::document_stats) | Document count + open-for-comment OR |
/// | [`document_dates`](DocketStore::document_dates) | Min/max document dates |
/// | [`docket_abstracts`](DocketStore::docket_abstracts) | Non-null abstracts |
/// | [`latest_htm_summaries`](DocketStore::latest_htm_summaries) | Most recent HTM summary per docket |
/// | [`invalidate_results`](DocketStore::invalidate_results) | Delete a fingerprint's stored rows |
/// | [`store_results`](DocketStore::store_results) | Persist an ordered result set |
/// | [`fetch_results`](DocketStore::fetch_results) | Read stored rows back in rank order |
#[async_trait]
pub trait DocketStore: Send + Sync {
    /// Fetch title/date/type rows for the given dockets.
    async fn docket_fields(&self, ids: &[String]) -> Result<Vec<DocketFieldsRow>>;

    /// Fetch agency identity rows for the given dockets. Dockets whose
    /// agency join misses simply have no row.
    async fn agency_fields(&self, ids: &[String]) -> Result<Vec<AgencyRow>>;

    /// Fetch per-docket document counts and the open-for-comment aggregate.
    async fn document_stats(&self, ids: &[String]) -> Result<Vec<DocumentStatsRow>>;

    /// Fetch per-docket min/max document dates.
    async fn document_dates(&self, ids: &[String]) -> Result<Vec<DocumentDatesRow>>;

    /// Fetch non-null abstracts for the given dockets.
    async fn docket_abstracts(&self, ids: &[String]) -> Result<Vec<SummaryRow>>;

    /// Fetch the most recent HTM summary for each of the given dockets.
    async fn latest_htm_summaries(&self, ids: &[String]) -> Result<Vec<SummaryRow>>;

    /// Delete every stored result row for the fingerprint. Runs before any
    /// fresh write so a refresh fully replaces the previous set.
    async fn invalidate_results(&self, fingerprint: &QueryFingerprint) -> Result<()>;

    /// Persist the first `limit` dockets of an ordered result set under the
    /// fingerprint, one row per rank, replacing any rows already stored for
    /// it. The replace holds even when `invalidate_results` was skipped or
    /// failed.
    async fn store_results(
        &self,
        fingerprint: &QueryFingerprint,
        dockets: &[EnrichedDocket],
        limit: usize,
    ) -> Result<()>;

    /// Fetch previously stored rows for the fingerprint, ordered by rank.
    /// An unknown fingerprint yields an empty set, not an error.
    async fn fetch_results(&self, fingerprint: &QueryFingerprint) -> Result<Vec<CachedResultRow>>;
}
