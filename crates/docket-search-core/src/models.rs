//! Data models for the docket search pipeline.
//!
//! These types represent the incoming search request, the per-docket records
//! that flow through aggregation, enrichment, and ranking, the persisted
//! stored-result row, and the query fingerprint that keys the result cache.
//! Wire-facing types serialize with the camelCase field names the calling
//! service expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Match statistics for one searchable field of one docket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCounts {
    /// Documents whose text phrase-matched the search term.
    #[serde(rename = "match")]
    pub matched: i64,
    /// Total documents indexed for the docket in this field.
    pub total: i64,
}

/// Per-docket aggregation output: one [`FieldCounts`] per searchable field.
///
/// Only dockets with at least one match in some field survive aggregation.
#[derive(Debug, Clone)]
pub struct DocketMatch {
    pub docket_id: String,
    pub comments: FieldCounts,
    pub attachments: FieldCounts,
}

/// Sort preference carried by the request.
///
/// The enforced result ordering never consults this value; it participates
/// only in the query fingerprint, so differently-sorted searches cache
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "dateModified")]
    DateModified,
    #[serde(rename = "alphaByTitle")]
    AlphaByTitle,
    #[serde(rename = "relevance")]
    Relevance,
}

impl SortType {
    /// Canonical string form, used in the fingerprint's stored columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::DateModified => "dateModified",
            SortType::AlphaByTitle => "alphaByTitle",
            SortType::Relevance => "relevance",
        }
    }
}

/// Sort parameters of a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortParams {
    pub sort_type: SortType,
    pub desc: bool,
}

/// Inclusive date-range bounds, carried as the ISO 8601 strings received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Filter parameters of a search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub agencies: Vec<String>,
    pub date_range: DateRange,
    pub docket_type: String,
}

/// A docket search request as received from the calling service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Full-text term to match against comment bodies and attachments.
    pub search_term: String,
    /// 0-based page to return.
    pub page_number: usize,
    /// `true` runs the full pipeline; `false` serves previously stored
    /// results for the same fingerprint.
    pub refresh_results: bool,
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub sort_params: SortParams,
    pub filter_params: FilterParams,
}

/// Document-derived timeline for a docket.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDates {
    pub date_modified: Option<DateTime<Utc>>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_comments_opened: Option<DateTime<Utc>>,
    /// Omitted from output, not emitted as null, when the docket has no
    /// comment-close date on record; absence means "still open".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_closed: Option<DateTime<Utc>>,
    pub date_effective: Option<DateTime<Utc>>,
}

/// A docket record as it accumulates fields across the pipeline.
///
/// Seeded from a [`DocketMatch`] on a fresh search, or from a persisted
/// [`CachedResultRow`] on a repeat request, then filled in by the enrichment
/// passes and finalized by ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDocket {
    pub docket_id: String,
    /// Body-text match statistics.
    pub comments: FieldCounts,
    /// Attachment-text match statistics. Not persisted with stored results,
    /// so omitted on cache-served responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<FieldCounts>,
    pub title: Option<String>,
    pub docket_type: Option<String>,
    pub agency_id: Option<String>,
    pub agency_name: Option<String>,
    pub summary: Option<String>,
    pub document_count: i64,
    pub is_open_for_comment: bool,
    pub timeline_dates: TimelineDates,
    pub relevance_score: f64,
    /// 0-based position in the final ordering.
    pub search_rank: i32,
}

impl EnrichedDocket {
    /// Seed a record from a fresh aggregation result.
    pub fn from_match(m: DocketMatch) -> Self {
        EnrichedDocket {
            docket_id: m.docket_id,
            comments: m.comments,
            attachments: Some(m.attachments),
            title: None,
            docket_type: None,
            agency_id: None,
            agency_name: None,
            summary: None,
            document_count: 0,
            is_open_for_comment: false,
            timeline_dates: TimelineDates::default(),
            relevance_score: 0.0,
            search_rank: 0,
        }
    }

    /// Seed a record from a stored-result row. Match statistics, score, and
    /// rank come from the persisted values and are never recomputed.
    pub fn from_cached(row: &CachedResultRow) -> Self {
        EnrichedDocket {
            docket_id: row.docket_id.clone(),
            comments: FieldCounts {
                matched: row.matching_comments,
                total: row.total_comments,
            },
            attachments: None,
            title: None,
            docket_type: None,
            agency_id: None,
            agency_name: None,
            summary: None,
            document_count: 0,
            is_open_for_comment: false,
            timeline_dates: TimelineDates::default(),
            relevance_score: row.relevance_score,
            search_rank: row.search_rank,
        }
    }
}

/// The page of results returned to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub current_page: usize,
    pub total_pages: usize,
    pub dockets: Vec<EnrichedDocket>,
}

/// One persisted row of an ordered result set.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResultRow {
    pub search_rank: i32,
    pub docket_id: String,
    pub total_comments: i64,
    pub matching_comments: i64,
    pub relevance_score: f64,
}

/// Normalized identity of a search.
///
/// Two requests with equal fingerprints are "the same search" and share a
/// stored-result set. Agency filters are sorted before joining, so requests
/// naming the same agencies in different orders collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFingerprint {
    pub search_term: String,
    pub session_id: String,
    pub sort_desc: bool,
    pub sort_type: SortType,
    /// Sorted, comma-joined agency ids; empty string when unfiltered.
    pub filter_agencies: String,
    pub filter_date_start: String,
    pub filter_date_end: String,
    pub filter_docket_type: String,
}

impl QueryFingerprint {
    pub fn from_request(req: &SearchRequest) -> Self {
        let mut agencies = req.filter_params.agencies.clone();
        agencies.sort();
        QueryFingerprint {
            search_term: req.search_term.clone(),
            session_id: req.session_id.clone(),
            sort_desc: req.sort_params.desc,
            sort_type: req.sort_params.sort_type,
            filter_agencies: agencies.join(","),
            filter_date_start: req.filter_params.date_range.start.clone(),
            filter_date_end: req.filter_params.date_range.end.clone(),
            filter_docket_type: req.filter_params.docket_type.clone(),
        }
    }
}
