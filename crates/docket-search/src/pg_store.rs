//! Postgres-backed [`DocketStore`] implementation.
//!
//! Maps each [`DocketStore`] operation to one SQL statement against the
//! mirrored regulations schema (dockets, agencies, documents, abstracts,
//! htm_summaries) plus the stored_results table backing the result cache.
//!
//! Every lookup binds the candidate id set as a single `ANY($1)` array
//! parameter, so an enrichment pass costs one round trip regardless of
//! result size.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use docket_search_core::error::{Result, SearchError};
use docket_search_core::models::{CachedResultRow, EnrichedDocket, QueryFingerprint};
use docket_search_core::store::{
    AgencyRow, DocketFieldsRow, DocketStore, DocumentDatesRow, DocumentStatsRow, SummaryRow,
};

/// Postgres implementation of the [`DocketStore`] trait.
///
/// Wraps an injected [`PgPool`]; no connection state lives outside the
/// struct, so each caller controls its own pool lifetime.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a post-connect sqlx failure onto the error taxonomy: transport
/// errors are connection failures even mid-request; anything else failed
/// during the named pass.
fn store_error(pass: &'static str, err: sqlx::Error) -> SearchError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => SearchError::connection(err),
        other => SearchError::retrieval(pass, other),
    }
}

#[async_trait]
impl DocketStore for PgStore {
    async fn docket_fields(&self, ids: &[String]) -> Result<Vec<DocketFieldsRow>> {
        let rows = sqlx::query(
            r#"
            SELECT docket_id, docket_title, modify_date, docket_type
            FROM dockets
            WHERE docket_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("docket fields", e))?;

        Ok(rows
            .iter()
            .map(|row| DocketFieldsRow {
                docket_id: row.get("docket_id"),
                title: row.get("docket_title"),
                modify_date: row.get("modify_date"),
                docket_type: row.get("docket_type"),
            })
            .collect())
    }

    async fn agency_fields(&self, ids: &[String]) -> Result<Vec<AgencyRow>> {
        let rows = sqlx::query(
            r#"
            SELECT d.docket_id, a.agency_id, a.agency_name
            FROM dockets d
            JOIN agencies a ON d.agency_id = a.agency_id
            WHERE d.docket_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("agency fields", e))?;

        Ok(rows
            .iter()
            .map(|row| AgencyRow {
                docket_id: row.get("docket_id"),
                agency_id: row.get("agency_id"),
                agency_name: row.get("agency_name"),
            })
            .collect())
    }

    async fn document_stats(&self, ids: &[String]) -> Result<Vec<DocumentStatsRow>> {
        // BOOL_OR is true when any document is open; COALESCE covers the
        // all-NULL group.
        let rows = sqlx::query(
            r#"
            SELECT docket_id,
                   COUNT(document_id) AS document_count,
                   COALESCE(BOOL_OR(is_open_for_comment), FALSE) AS is_open
            FROM documents
            WHERE docket_id = ANY($1)
            GROUP BY docket_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("document counts", e))?;

        Ok(rows
            .iter()
            .map(|row| DocumentStatsRow {
                docket_id: row.get("docket_id"),
                document_count: row.get("document_count"),
                is_open_for_comment: row.get("is_open"),
            })
            .collect())
    }

    async fn document_dates(&self, ids: &[String]) -> Result<Vec<DocumentDatesRow>> {
        let rows = sqlx::query(
            r#"
            SELECT docket_id,
                   MIN(posted_date) AS date_posted,
                   MIN(comment_start_date) AS comment_start,
                   MAX(comment_end_date) AS comment_end,
                   MIN(effective_date) AS date_effective
            FROM documents
            WHERE docket_id = ANY($1)
            GROUP BY docket_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("document dates", e))?;

        Ok(rows
            .iter()
            .map(|row| DocumentDatesRow {
                docket_id: row.get("docket_id"),
                date_posted: row.get("date_posted"),
                comment_start: row.get("comment_start"),
                comment_end: row.get("comment_end"),
                date_effective: row.get("date_effective"),
            })
            .collect())
    }

    async fn docket_abstracts(&self, ids: &[String]) -> Result<Vec<SummaryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT docket_id, abstract
            FROM abstracts
            WHERE docket_id = ANY($1) AND abstract IS NOT NULL
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("abstracts", e))?;

        Ok(rows
            .iter()
            .map(|row| SummaryRow {
                docket_id: row.get("docket_id"),
                text: row.get("abstract"),
            })
            .collect())
    }

    async fn latest_htm_summaries(&self, ids: &[String]) -> Result<Vec<SummaryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (docket_id) docket_id, summary
            FROM htm_summaries
            WHERE docket_id = ANY($1) AND summary IS NOT NULL
            ORDER BY docket_id, summary_id DESC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("htm summaries", e))?;

        Ok(rows
            .iter()
            .map(|row| SummaryRow {
                docket_id: row.get("docket_id"),
                text: row.get("summary"),
            })
            .collect())
    }

    async fn invalidate_results(&self, fingerprint: &QueryFingerprint) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM stored_results
            WHERE search_term = $1 AND session_id = $2 AND sort_desc = $3 AND sort_type = $4
              AND filter_agencies = $5 AND filter_date_start = $6 AND filter_date_end = $7
              AND filter_docket_type = $8
            "#,
        )
        .bind(&fingerprint.search_term)
        .bind(&fingerprint.session_id)
        .bind(fingerprint.sort_desc)
        .bind(fingerprint.sort_type.as_str())
        .bind(&fingerprint.filter_agencies)
        .bind(&fingerprint.filter_date_start)
        .bind(&fingerprint.filter_date_end)
        .bind(&fingerprint.filter_docket_type)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("stored_results", e))?;

        Ok(())
    }

    async fn store_results(
        &self,
        fingerprint: &QueryFingerprint,
        dockets: &[EnrichedDocket],
        limit: usize,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("stored_results", e))?;

        // Replace the whole set in one transaction, so a skipped invalidation
        // cannot leave rows from two refreshes interleaved.
        sqlx::query(
            r#"
            DELETE FROM stored_results
            WHERE search_term = $1 AND session_id = $2 AND sort_desc = $3 AND sort_type = $4
              AND filter_agencies = $5 AND filter_date_start = $6 AND filter_date_end = $7
              AND filter_docket_type = $8
            "#,
        )
        .bind(&fingerprint.search_term)
        .bind(&fingerprint.session_id)
        .bind(fingerprint.sort_desc)
        .bind(fingerprint.sort_type.as_str())
        .bind(&fingerprint.filter_agencies)
        .bind(&fingerprint.filter_date_start)
        .bind(&fingerprint.filter_date_end)
        .bind(&fingerprint.filter_docket_type)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("stored_results", e))?;

        for docket in dockets.iter().take(limit) {
            sqlx::query(
                r#"
                INSERT INTO stored_results (
                    search_term, session_id, sort_desc, sort_type,
                    filter_agencies, filter_date_start, filter_date_end, filter_docket_type,
                    search_rank, docket_id, total_comments, matching_comments, relevance_score
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(&fingerprint.search_term)
            .bind(&fingerprint.session_id)
            .bind(fingerprint.sort_desc)
            .bind(fingerprint.sort_type.as_str())
            .bind(&fingerprint.filter_agencies)
            .bind(&fingerprint.filter_date_start)
            .bind(&fingerprint.filter_date_end)
            .bind(&fingerprint.filter_docket_type)
            .bind(docket.search_rank)
            .bind(&docket.docket_id)
            .bind(docket.comments.total)
            .bind(docket.comments.matched)
            .bind(docket.relevance_score)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_error("stored_results", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| store_error("stored_results", e))?;

        Ok(())
    }

    async fn fetch_results(&self, fingerprint: &QueryFingerprint) -> Result<Vec<CachedResultRow>> {
        let rows = sqlx::query(
            r#"
            SELECT search_rank, docket_id, total_comments, matching_comments, relevance_score
            FROM stored_results
            WHERE search_term = $1 AND session_id = $2 AND sort_desc = $3 AND sort_type = $4
              AND filter_agencies = $5 AND filter_date_start = $6 AND filter_date_end = $7
              AND filter_docket_type = $8
            ORDER BY search_rank
            "#,
        )
        .bind(&fingerprint.search_term)
        .bind(&fingerprint.session_id)
        .bind(fingerprint.sort_desc)
        .bind(fingerprint.sort_type.as_str())
        .bind(&fingerprint.filter_agencies)
        .bind(&fingerprint.filter_date_start)
        .bind(&fingerprint.filter_date_end)
        .bind(&fingerprint.filter_docket_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("stored_results", e))?;

        Ok(rows
            .iter()
            .map(|row| CachedResultRow {
                search_rank: row.get("search_rank"),
                docket_id: row.get("docket_id"),
                total_comments: row.get("total_comments"),
                matching_comments: row.get("matching_comments"),
                relevance_score: row.get("relevance_score"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failures_map_to_connection() {
        let err = store_error("docket fields", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, SearchError::Connection(_)));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = store_error("docket fields", sqlx::Error::Io(io));
        assert!(matches!(err, SearchError::Connection(_)));
    }

    #[test]
    fn test_query_failures_map_to_retrieval() {
        let err = store_error("agency fields", sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            SearchError::Retrieval {
                pass: "agency fields",
                ..
            }
        ));
        assert!(err.to_string().contains("agency fields"));
    }
}
