//! In-memory [`DocketStore`] implementation for tests and local development.
//!
//! Holds plain table-shaped rows behind `std::sync::RwLock` and is seeded
//! one row at a time, mirroring the relational schema. Stored-result writes
//! can be made to fail on demand so callers' degraded paths are testable.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Result, SearchError};
use crate::models::{CachedResultRow, EnrichedDocket, QueryFingerprint};

use super::{
    AgencyRow, DocketFieldsRow, DocketStore, DocumentDatesRow, DocumentStatsRow, SummaryRow,
};

struct DocketRow {
    title: Option<String>,
    modify_date: Option<DateTime<Utc>>,
    docket_type: Option<String>,
    agency_id: Option<String>,
}

struct DocumentRow {
    docket_id: String,
    is_open_for_comment: Option<bool>,
    posted_date: Option<DateTime<Utc>>,
    comment_start_date: Option<DateTime<Utc>>,
    comment_end_date: Option<DateTime<Utc>>,
    effective_date: Option<DateTime<Utc>>,
}

struct HtmSummaryRow {
    docket_id: String,
    summary_id: i64,
    summary: String,
}

/// In-memory store for tests and local development.
pub struct MemoryStore {
    dockets: RwLock<HashMap<String, DocketRow>>,
    agencies: RwLock<HashMap<String, String>>,
    documents: RwLock<Vec<DocumentRow>>,
    abstracts: RwLock<HashMap<String, String>>,
    htm_summaries: RwLock<Vec<HtmSummaryRow>>,
    results: RwLock<HashMap<QueryFingerprint, Vec<CachedResultRow>>>,
    fail_result_writes: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            dockets: RwLock::new(HashMap::new()),
            agencies: RwLock::new(HashMap::new()),
            documents: RwLock::new(Vec::new()),
            abstracts: RwLock::new(HashMap::new()),
            htm_summaries: RwLock::new(Vec::new()),
            results: RwLock::new(HashMap::new()),
            fail_result_writes: RwLock::new(false),
        }
    }

    /// Insert a docket row.
    pub fn insert_docket(
        &self,
        docket_id: &str,
        title: Option<&str>,
        modify_date: Option<DateTime<Utc>>,
        docket_type: Option<&str>,
        agency_id: Option<&str>,
    ) {
        self.dockets.write().unwrap().insert(
            docket_id.to_string(),
            DocketRow {
                title: title.map(str::to_string),
                modify_date,
                docket_type: docket_type.map(str::to_string),
                agency_id: agency_id.map(str::to_string),
            },
        );
    }

    /// Insert an agency row.
    pub fn insert_agency(&self, agency_id: &str, agency_name: &str) {
        self.agencies
            .write()
            .unwrap()
            .insert(agency_id.to_string(), agency_name.to_string());
    }

    /// Insert a document row for a docket.
    pub fn insert_document(
        &self,
        docket_id: &str,
        is_open_for_comment: Option<bool>,
        posted_date: Option<DateTime<Utc>>,
        comment_start_date: Option<DateTime<Utc>>,
        comment_end_date: Option<DateTime<Utc>>,
        effective_date: Option<DateTime<Utc>>,
    ) {
        self.documents.write().unwrap().push(DocumentRow {
            docket_id: docket_id.to_string(),
            is_open_for_comment,
            posted_date,
            comment_start_date,
            comment_end_date,
            effective_date,
        });
    }

    /// Insert a docket abstract.
    pub fn insert_abstract(&self, docket_id: &str, text: &str) {
        self.abstracts
            .write()
            .unwrap()
            .insert(docket_id.to_string(), text.to_string());
    }

    /// Insert an HTM summary row.
    pub fn insert_htm_summary(&self, docket_id: &str, summary_id: i64, summary: &str) {
        self.htm_summaries.write().unwrap().push(HtmSummaryRow {
            docket_id: docket_id.to_string(),
            summary_id,
            summary: summary.to_string(),
        });
    }

    /// Make subsequent `invalidate_results`/`store_results` calls fail.
    pub fn fail_result_writes(&self, fail: bool) {
        *self.fail_result_writes.write().unwrap() = fail;
    }

    /// Raw stored rows for a fingerprint, in insertion order.
    pub fn stored_rows(&self, fingerprint: &QueryFingerprint) -> Vec<CachedResultRow> {
        self.results
            .read()
            .unwrap()
            .get(fingerprint)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocketStore for MemoryStore {
    async fn docket_fields(&self, ids: &[String]) -> Result<Vec<DocketFieldsRow>> {
        let dockets = self.dockets.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                dockets.get(id).map(|row| DocketFieldsRow {
                    docket_id: id.clone(),
                    title: row.title.clone(),
                    modify_date: row.modify_date,
                    docket_type: row.docket_type.clone(),
                })
            })
            .collect())
    }

    async fn agency_fields(&self, ids: &[String]) -> Result<Vec<AgencyRow>> {
        let dockets = self.dockets.read().unwrap();
        let agencies = self.agencies.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                let agency_id = dockets.get(id).and_then(|row| row.agency_id.clone())?;
                let agency_name = agencies.get(&agency_id)?;
                Some(AgencyRow {
                    docket_id: id.clone(),
                    agency_id,
                    agency_name: Some(agency_name.clone()),
                })
            })
            .collect())
    }

    async fn document_stats(&self, ids: &[String]) -> Result<Vec<DocumentStatsRow>> {
        let documents = self.documents.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                let rows: Vec<&DocumentRow> =
                    documents.iter().filter(|d| &d.docket_id == id).collect();
                if rows.is_empty() {
                    return None;
                }
                Some(DocumentStatsRow {
                    docket_id: id.clone(),
                    document_count: rows.len() as i64,
                    is_open_for_comment: rows
                        .iter()
                        .any(|d| d.is_open_for_comment == Some(true)),
                })
            })
            .collect())
    }

    async fn document_dates(&self, ids: &[String]) -> Result<Vec<DocumentDatesRow>> {
        let documents = self.documents.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                let rows: Vec<&DocumentRow> =
                    documents.iter().filter(|d| &d.docket_id == id).collect();
                if rows.is_empty() {
                    return None;
                }
                Some(DocumentDatesRow {
                    docket_id: id.clone(),
                    date_posted: rows.iter().filter_map(|d| d.posted_date).min(),
                    comment_start: rows.iter().filter_map(|d| d.comment_start_date).min(),
                    comment_end: rows.iter().filter_map(|d| d.comment_end_date).max(),
                    date_effective: rows.iter().filter_map(|d| d.effective_date).min(),
                })
            })
            .collect())
    }

    async fn docket_abstracts(&self, ids: &[String]) -> Result<Vec<SummaryRow>> {
        let abstracts = self.abstracts.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                abstracts.get(id).map(|text| SummaryRow {
                    docket_id: id.clone(),
                    text: text.clone(),
                })
            })
            .collect())
    }

    async fn latest_htm_summaries(&self, ids: &[String]) -> Result<Vec<SummaryRow>> {
        let summaries = self.htm_summaries.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                summaries
                    .iter()
                    .filter(|s| &s.docket_id == id)
                    .max_by_key(|s| s.summary_id)
                    .map(|s| SummaryRow {
                        docket_id: id.clone(),
                        text: s.summary.clone(),
                    })
            })
            .collect())
    }

    async fn invalidate_results(&self, fingerprint: &QueryFingerprint) -> Result<()> {
        if *self.fail_result_writes.read().unwrap() {
            return Err(SearchError::retrieval("stored_results", "write disabled"));
        }
        self.results.write().unwrap().remove(fingerprint);
        Ok(())
    }

    async fn store_results(
        &self,
        fingerprint: &QueryFingerprint,
        dockets: &[EnrichedDocket],
        limit: usize,
    ) -> Result<()> {
        if *self.fail_result_writes.read().unwrap() {
            return Err(SearchError::retrieval("stored_results", "write disabled"));
        }
        let rows: Vec<CachedResultRow> = dockets
            .iter()
            .take(limit)
            .map(|d| CachedResultRow {
                search_rank: d.search_rank,
                docket_id: d.docket_id.clone(),
                total_comments: d.comments.total,
                matching_comments: d.comments.matched,
                relevance_score: d.relevance_score,
            })
            .collect();
        // Replaces the fingerprint's set outright; a skipped invalidation
        // must not leave rows from the prior refresh behind.
        self.results
            .write()
            .unwrap()
            .insert(fingerprint.clone(), rows);
        Ok(())
    }

    async fn fetch_results(&self, fingerprint: &QueryFingerprint) -> Result<Vec<CachedResultRow>> {
        let mut rows = self.stored_rows(fingerprint);
        rows.sort_by_key(|r| r.search_rank);
        Ok(rows)
    }
}
