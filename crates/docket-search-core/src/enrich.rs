//! Relational enrichment passes.
//!
//! Five idempotent passes, each a single batched store lookup applied over
//! the whole candidate set. Any store failure aborts enrichment; a
//! partially enriched set is never returned.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::EnrichedDocket;
use crate::store::DocketStore;

/// Sentinel agency id used when a docket has no agency row.
pub const AGENCY_NOT_FOUND: &str = "Agency Not Found";
/// Sentinel agency name used when a docket has no agency row.
pub const AGENCY_NAME_NOT_FOUND: &str = "Agency Name Not Found";

/// Minimum word count for a docket abstract to serve as its summary.
const MIN_ABSTRACT_WORDS: usize = 10;

/// Run every enrichment pass over `dockets`, in order.
///
/// 1. Docket fields (title, modification date, type). Dockets without a
///    usable title are removed here, before any later pass runs.
/// 2. Agency identity, with "not found" sentinels when the join misses.
/// 3. Document count and open-for-comment flag, defaulting to zero/false.
/// 4. Document timeline dates; a missing close date forces the docket open.
/// 5. Summary (abstract, HTM fallback, or none).
pub async fn enrich<S: DocketStore>(
    store: &S,
    mut dockets: Vec<EnrichedDocket>,
) -> Result<Vec<EnrichedDocket>> {
    apply_docket_fields(store, &mut dockets).await?;
    let before = dockets.len();
    dockets.retain(|d| d.title.is_some());
    if dockets.len() < before {
        tracing::debug!(dropped = before - dockets.len(), "removed untitled dockets");
    }
    apply_agency_fields(store, &mut dockets).await?;
    apply_document_stats(store, &mut dockets).await?;
    apply_document_dates(store, &mut dockets).await?;
    apply_summaries(store, &mut dockets).await?;
    Ok(dockets)
}

fn docket_ids(dockets: &[EnrichedDocket]) -> Vec<String> {
    dockets.iter().map(|d| d.docket_id.clone()).collect()
}

/// Attach title, modification date, and docket type. Dockets absent from
/// the dockets table are left untouched (no title) for the caller's filter.
pub async fn apply_docket_fields<S: DocketStore>(
    store: &S,
    dockets: &mut [EnrichedDocket],
) -> Result<()> {
    if dockets.is_empty() {
        return Ok(());
    }
    let rows = store.docket_fields(&docket_ids(dockets)).await?;
    let by_id: HashMap<String, _> = rows.into_iter().map(|r| (r.docket_id.clone(), r)).collect();
    for d in dockets.iter_mut() {
        if let Some(row) = by_id.get(&d.docket_id) {
            d.title = row.title.clone();
            d.docket_type = row.docket_type.clone();
            d.timeline_dates.date_modified = row.modify_date;
        }
    }
    Ok(())
}

/// Attach agency identity, substituting sentinels when the join misses.
/// Dockets are never dropped for a missing agency.
pub async fn apply_agency_fields<S: DocketStore>(
    store: &S,
    dockets: &mut [EnrichedDocket],
) -> Result<()> {
    if dockets.is_empty() {
        return Ok(());
    }
    let rows = store.agency_fields(&docket_ids(dockets)).await?;
    let by_id: HashMap<String, _> = rows.into_iter().map(|r| (r.docket_id.clone(), r)).collect();
    for d in dockets.iter_mut() {
        match by_id.get(&d.docket_id) {
            Some(row) => {
                d.agency_id = Some(row.agency_id.clone());
                d.agency_name = row.agency_name.clone();
            }
            None => {
                d.agency_id = Some(AGENCY_NOT_FOUND.to_string());
                d.agency_name = Some(AGENCY_NAME_NOT_FOUND.to_string());
            }
        }
    }
    Ok(())
}

/// Attach document count and the open-for-comment aggregate, defaulting to
/// zero/false for dockets with no documents.
pub async fn apply_document_stats<S: DocketStore>(
    store: &S,
    dockets: &mut [EnrichedDocket],
) -> Result<()> {
    if dockets.is_empty() {
        return Ok(());
    }
    let rows = store.document_stats(&docket_ids(dockets)).await?;
    let by_id: HashMap<String, _> = rows.into_iter().map(|r| (r.docket_id.clone(), r)).collect();
    for d in dockets.iter_mut() {
        match by_id.get(&d.docket_id) {
            Some(row) => {
                d.document_count = row.document_count;
                d.is_open_for_comment = row.is_open_for_comment;
            }
            None => {
                d.document_count = 0;
                d.is_open_for_comment = false;
            }
        }
    }
    Ok(())
}

/// Attach min/max document dates and resolve the open-for-comment flag.
///
/// A docket with no recorded comment-close date is open by definition,
/// whatever the document-level flags said.
pub async fn apply_document_dates<S: DocketStore>(
    store: &S,
    dockets: &mut [EnrichedDocket],
) -> Result<()> {
    if dockets.is_empty() {
        return Ok(());
    }
    let rows = store.document_dates(&docket_ids(dockets)).await?;
    let by_id: HashMap<String, _> = rows.into_iter().map(|r| (r.docket_id.clone(), r)).collect();
    for d in dockets.iter_mut() {
        if let Some(row) = by_id.get(&d.docket_id) {
            d.timeline_dates.date_created = row.date_posted;
            d.timeline_dates.date_comments_opened = row.comment_start;
            d.timeline_dates.date_closed = row.comment_end;
            d.timeline_dates.date_effective = row.date_effective;
        }
        if d.timeline_dates.date_closed.is_none() {
            d.is_open_for_comment = true;
        }
    }
    Ok(())
}

/// Attach a summary: the docket abstract when it is substantial enough,
/// otherwise the most recent HTM summary, otherwise nothing.
pub async fn apply_summaries<S: DocketStore>(
    store: &S,
    dockets: &mut [EnrichedDocket],
) -> Result<()> {
    if dockets.is_empty() {
        return Ok(());
    }
    let rows = store.docket_abstracts(&docket_ids(dockets)).await?;
    let abstract_by_id: HashMap<String, String> =
        rows.into_iter().map(|r| (r.docket_id, r.text)).collect();

    let usable =
        |id: &str| -> bool { abstract_by_id.get(id).is_some_and(|t| word_count(t) >= MIN_ABSTRACT_WORDS) };

    let unresolved: Vec<String> = dockets
        .iter()
        .filter(|d| !usable(&d.docket_id))
        .map(|d| d.docket_id.clone())
        .collect();
    let htm_by_id: HashMap<String, String> = if unresolved.is_empty() {
        HashMap::new()
    } else {
        store
            .latest_htm_summaries(&unresolved)
            .await?
            .into_iter()
            .map(|r| (r.docket_id, r.text))
            .collect()
    };

    for d in dockets.iter_mut() {
        d.summary = if usable(&d.docket_id) {
            abstract_by_id.get(&d.docket_id).cloned()
        } else {
            htm_by_id.get(&d.docket_id).cloned()
        };
    }
    Ok(())
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocketMatch, FieldCounts};
    use crate::store::memory::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn seed_docket(matched: i64, total: i64, id: &str) -> EnrichedDocket {
        EnrichedDocket::from_match(DocketMatch {
            docket_id: id.to_string(),
            comments: FieldCounts { matched, total },
            attachments: FieldCounts::default(),
        })
    }

    fn ts(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_untitled_dockets_are_dropped() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("Water rules"), Some(ts(2024, 1, 1)), None, None);
        store.insert_docket("D2", None, Some(ts(2024, 1, 1)), None, None);
        // D3 has no docket row at all.

        let out = enrich(
            &store,
            vec![seed_docket(1, 2, "D1"), seed_docket(1, 2, "D2"), seed_docket(1, 2, "D3")],
        )
        .await
        .unwrap();

        let ids: Vec<&str> = out.iter().map(|d| d.docket_id.as_str()).collect();
        assert_eq!(ids, vec!["D1"]);
        assert_eq!(out[0].title.as_deref(), Some("Water rules"));
    }

    #[tokio::test]
    async fn test_missing_agency_gets_sentinels() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, Some("EPA"));
        store.insert_agency("EPA", "Environmental Protection Agency");
        store.insert_docket("D2", Some("t"), None, None, None);

        let out = enrich(&store, vec![seed_docket(1, 2, "D1"), seed_docket(1, 2, "D2")])
            .await
            .unwrap();

        assert_eq!(out[0].agency_id.as_deref(), Some("EPA"));
        assert_eq!(
            out[0].agency_name.as_deref(),
            Some("Environmental Protection Agency")
        );
        assert_eq!(out[1].agency_id.as_deref(), Some(AGENCY_NOT_FOUND));
        assert_eq!(out[1].agency_name.as_deref(), Some(AGENCY_NAME_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_document_stats_default_to_zero() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_docket("D2", Some("t"), None, None, None);
        store.insert_document("D1", Some(true), None, None, Some(ts(2030, 1, 1)), None);
        store.insert_document("D1", Some(false), None, None, Some(ts(2030, 1, 1)), None);

        let out = enrich(&store, vec![seed_docket(1, 2, "D1"), seed_docket(1, 2, "D2")])
            .await
            .unwrap();

        assert_eq!(out[0].document_count, 2);
        assert!(out[0].is_open_for_comment);
        assert_eq!(out[1].document_count, 0);
    }

    #[tokio::test]
    async fn test_missing_close_date_forces_open() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_document("D1", Some(false), Some(ts(2024, 1, 5)), None, None, None);

        let out = enrich(&store, vec![seed_docket(1, 2, "D1")]).await.unwrap();

        assert!(out[0].is_open_for_comment);
        assert!(out[0].timeline_dates.date_closed.is_none());
        assert_eq!(out[0].timeline_dates.date_created, Some(ts(2024, 1, 5)));
    }

    #[tokio::test]
    async fn test_close_date_present_keeps_flag() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_document(
            "D1",
            Some(false),
            Some(ts(2024, 1, 5)),
            Some(ts(2024, 1, 10)),
            Some(ts(2024, 2, 10)),
            None,
        );

        let out = enrich(&store, vec![seed_docket(1, 2, "D1")]).await.unwrap();

        assert!(!out[0].is_open_for_comment);
        assert_eq!(out[0].timeline_dates.date_closed, Some(ts(2024, 2, 10)));
        assert_eq!(
            out[0].timeline_dates.date_comments_opened,
            Some(ts(2024, 1, 10))
        );
    }

    #[tokio::test]
    async fn test_timeline_aggregates_min_and_max() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_document(
            "D1",
            None,
            Some(ts(2024, 3, 1)),
            Some(ts(2024, 3, 5)),
            Some(ts(2024, 4, 1)),
            Some(ts(2024, 6, 1)),
        );
        store.insert_document(
            "D1",
            None,
            Some(ts(2024, 1, 1)),
            Some(ts(2024, 1, 5)),
            Some(ts(2024, 5, 1)),
            Some(ts(2024, 5, 1)),
        );

        let out = enrich(&store, vec![seed_docket(1, 2, "D1")]).await.unwrap();
        let dates = &out[0].timeline_dates;
        assert_eq!(dates.date_created, Some(ts(2024, 1, 1)));
        assert_eq!(dates.date_comments_opened, Some(ts(2024, 1, 5)));
        assert_eq!(dates.date_closed, Some(ts(2024, 5, 1)));
        assert_eq!(dates.date_effective, Some(ts(2024, 5, 1)));
    }

    #[tokio::test]
    async fn test_summary_prefers_substantial_abstract() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_abstract(
            "D1",
            "A proposed rule establishing effluent limits for discharges from industrial facilities",
        );
        store.insert_htm_summary("D1", 1, "older summary");

        let out = enrich(&store, vec![seed_docket(1, 2, "D1")]).await.unwrap();
        assert!(out[0].summary.as_deref().unwrap().starts_with("A proposed rule"));
    }

    #[tokio::test]
    async fn test_short_abstract_falls_back_to_latest_htm_summary() {
        let store = MemoryStore::new();
        store.insert_docket("D1", Some("t"), None, None, None);
        store.insert_abstract("D1", "Too short to use");
        store.insert_htm_summary("D1", 1, "first");
        store.insert_htm_summary("D1", 7, "latest");
        store.insert_docket("D2", Some("t"), None, None, None);

        let out = enrich(&store, vec![seed_docket(1, 2, "D1"), seed_docket(1, 2, "D2")])
            .await
            .unwrap();
        assert_eq!(out[0].summary.as_deref(), Some("latest"));
        assert_eq!(out[1].summary, None);
    }
}
