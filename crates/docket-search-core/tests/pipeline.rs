//! End-to-end pipeline tests over the in-memory index and store.

use chrono::Utc;
use docket_search_core::index::{SearchField, StaticIndex};
use docket_search_core::models::{
    DateRange, DocketMatch, EnrichedDocket, FieldCounts, FilterParams, QueryFingerprint,
    SearchRequest, SortParams, SortType,
};
use docket_search_core::search::search;
use docket_search_core::store::memory::MemoryStore;
use docket_search_core::store::DocketStore;

fn request(term: &str, page: usize, refresh: bool) -> SearchRequest {
    SearchRequest {
        search_term: term.to_string(),
        page_number: page,
        refresh_results: refresh,
        session_id: "session1".to_string(),
        sort_params: SortParams {
            sort_type: SortType::DateModified,
            desc: true,
        },
        filter_params: FilterParams {
            agencies: Vec::new(),
            date_range: DateRange {
                start: "1970-01-01T00:00:00Z".to_string(),
                end: "2025-03-21T00:00:00Z".to_string(),
            },
            docket_type: String::new(),
        },
    }
}

#[tokio::test]
async fn test_fresh_search_single_docket() {
    let index = StaticIndex::new().with_field(SearchField::CommentText, &[("D1", 3, 10)]);
    let store = MemoryStore::new();
    store.insert_docket(
        "D1",
        Some("National water quality standards"),
        Some(Utc::now()),
        Some("Rulemaking"),
        Some("EPA"),
    );
    store.insert_agency("EPA", "Environmental Protection Agency");
    // One document, flagged closed, but with no close date on record.
    store.insert_document("D1", Some(false), Some(Utc::now()), None, None, None);

    let response = search(&index, &store, &request("National", 0, true))
        .await
        .unwrap();

    assert_eq!(response.current_page, 0);
    assert_eq!(response.total_pages, 1);
    assert_eq!(response.dockets.len(), 1);

    let d = &response.dockets[0];
    assert_eq!(d.docket_id, "D1");
    assert_eq!(d.search_rank, 0);
    assert_eq!(d.comments.matched, 3);
    assert_eq!(d.comments.total, 10);
    assert_eq!(d.title.as_deref(), Some("National water quality standards"));
    assert_eq!(d.agency_name.as_deref(), Some("Environmental Protection Agency"));
    // Zero-day-old modification date: decay is 1, score is 10 * 0.3^2.
    assert!((d.relevance_score - 0.9).abs() < 1e-9);
    // No close date on record means the docket counts as open.
    assert!(d.is_open_for_comment);
    assert!(d.timeline_dates.date_closed.is_none());
}

#[tokio::test]
async fn test_docket_absent_from_store_is_excluded() {
    let index = StaticIndex::new()
        .with_field(SearchField::CommentText, &[("D1", 2, 4), ("D2", 5, 5)]);
    let store = MemoryStore::new();
    store.insert_docket("D1", Some("Known docket"), Some(Utc::now()), None, None);
    // D2 exists only in the search index.

    let req = request("term", 0, true);
    let response = search(&index, &store, &req).await.unwrap();

    assert_eq!(response.dockets.len(), 1);
    assert_eq!(response.dockets[0].docket_id, "D1");

    // The excluded docket is not persisted either.
    let fp = QueryFingerprint::from_request(&req);
    let rows = store.fetch_results(&fp).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].docket_id, "D1");
}

#[tokio::test]
async fn test_attachment_only_match_enters_results() {
    let index = StaticIndex::new()
        .with_field(SearchField::CommentText, &[("D1", 0, 5)])
        .with_field(SearchField::AttachmentText, &[("D1", 2, 8)]);
    let store = MemoryStore::new();
    store.insert_docket("D1", Some("t"), Some(Utc::now()), None, None);

    let response = search(&index, &store, &request("term", 0, true))
        .await
        .unwrap();

    assert_eq!(response.dockets.len(), 1);
    let d = &response.dockets[0];
    assert_eq!(d.comments.matched, 0);
    assert_eq!(d.attachments.unwrap().matched, 2);
    // No body matches at all: the score contribution is zero.
    assert_eq!(d.relevance_score, 0.0);
}

#[tokio::test]
async fn test_pagination_of_25_results() {
    let ids: Vec<String> = (0..25).map(|i| format!("D{:02}", i)).collect();
    let counts: Vec<(&str, i64, i64)> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i as i64 + 1, 30))
        .collect();
    let index = StaticIndex::new().with_field(SearchField::CommentText, &counts);
    let store = MemoryStore::new();
    for id in &ids {
        store.insert_docket(id, Some("t"), Some(Utc::now()), None, None);
    }

    let page0 = search(&index, &store, &request("term", 0, true))
        .await
        .unwrap();
    assert_eq!(page0.total_pages, 3);
    assert_eq!(page0.dockets.len(), 10);
    // Most matches first: D24 leads.
    assert_eq!(page0.dockets[0].docket_id, "D24");
    assert_eq!(page0.dockets[0].search_rank, 0);

    let page2 = search(&index, &store, &request("term", 2, false))
        .await
        .unwrap();
    assert_eq!(page2.current_page, 2);
    assert_eq!(page2.total_pages, 3);
    assert_eq!(page2.dockets.len(), 5);
    let ranks: Vec<i32> = page2.dockets.iter().map(|d| d.search_rank).collect();
    assert_eq!(ranks, vec![20, 21, 22, 23, 24]);
    assert_eq!(page2.dockets[0].docket_id, "D04");

    let page3 = search(&index, &store, &request("term", 3, false))
        .await
        .unwrap();
    assert_eq!(page3.current_page, 3);
    assert_eq!(page3.total_pages, 3);
    assert!(page3.dockets.is_empty());
}

#[tokio::test]
async fn test_repeat_request_serves_stored_order_and_scores() {
    let index = StaticIndex::new()
        .with_field(SearchField::CommentText, &[("D1", 3, 10), ("D2", 7, 9)]);
    let store = MemoryStore::new();
    store.insert_docket("D1", Some("First"), Some(Utc::now()), None, None);
    store.insert_docket("D2", Some("Second"), Some(Utc::now()), None, None);

    let fresh = search(&index, &store, &request("term", 0, true))
        .await
        .unwrap();
    assert_eq!(fresh.dockets[0].docket_id, "D2");

    // The repeat request runs without touching the index at all.
    let empty_index = StaticIndex::new();
    let cached = search(&empty_index, &store, &request("term", 0, false))
        .await
        .unwrap();

    assert_eq!(cached.dockets.len(), 2);
    for (f, c) in fresh.dockets.iter().zip(cached.dockets.iter()) {
        assert_eq!(f.docket_id, c.docket_id);
        assert_eq!(f.search_rank, c.search_rank);
        assert_eq!(f.relevance_score, c.relevance_score);
        assert_eq!(f.comments, c.comments);
    }
    // Presentation fields are re-attached; attachment counts are not stored.
    assert_eq!(cached.dockets[0].title.as_deref(), Some("Second"));
    assert!(cached.dockets[0].attachments.is_none());
}

#[tokio::test]
async fn test_refresh_fully_replaces_stored_results() {
    let store = MemoryStore::new();
    for id in ["D1", "D2", "D3"] {
        store.insert_docket(id, Some("t"), Some(Utc::now()), None, None);
    }

    let wide = StaticIndex::new().with_field(
        SearchField::CommentText,
        &[("D1", 1, 10), ("D2", 2, 10), ("D3", 3, 10)],
    );
    let req = request("term", 0, true);
    search(&wide, &store, &req).await.unwrap();

    let fp = QueryFingerprint::from_request(&req);
    assert_eq!(store.fetch_results(&fp).await.unwrap().len(), 3);

    let narrow = StaticIndex::new().with_field(SearchField::CommentText, &[("D2", 4, 10)]);
    search(&narrow, &store, &req).await.unwrap();

    let rows = store.fetch_results(&fp).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].docket_id, "D2");
    assert_eq!(rows[0].search_rank, 0);
    assert_eq!(rows[0].matching_comments, 4);
}

#[tokio::test]
async fn test_store_replaces_prior_set_without_invalidation() {
    let store = MemoryStore::new();
    let req = request("term", 0, true);
    let fp = QueryFingerprint::from_request(&req);

    let old: Vec<EnrichedDocket> = ["D1", "D2", "D3"]
        .iter()
        .enumerate()
        .map(|(rank, id)| {
            let mut d = EnrichedDocket::from_match(DocketMatch {
                docket_id: id.to_string(),
                comments: FieldCounts { matched: 1, total: 5 },
                attachments: FieldCounts::default(),
            });
            d.search_rank = rank as i32;
            d
        })
        .collect();
    store.store_results(&fp, &old, 100).await.unwrap();

    // A second store for the same fingerprint, with no invalidation in
    // between, must not leave rank collisions from the first set behind.
    let mut new = EnrichedDocket::from_match(DocketMatch {
        docket_id: "D9".to_string(),
        comments: FieldCounts { matched: 8, total: 8 },
        attachments: FieldCounts::default(),
    });
    new.search_rank = 0;
    store.store_results(&fp, &[new], 100).await.unwrap();

    let rows = store.fetch_results(&fp).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].docket_id, "D9");
    assert_eq!(rows[0].search_rank, 0);
}

#[tokio::test]
async fn test_stored_write_failure_still_returns_results() {
    let index = StaticIndex::new().with_field(SearchField::CommentText, &[("D1", 1, 2)]);
    let store = MemoryStore::new();
    store.insert_docket("D1", Some("t"), Some(Utc::now()), None, None);
    store.fail_result_writes(true);

    let req = request("term", 0, true);
    let response = search(&index, &store, &req).await.unwrap();

    assert_eq!(response.dockets.len(), 1);
    let fp = QueryFingerprint::from_request(&req);
    assert!(store.stored_rows(&fp).is_empty());
}

#[tokio::test]
async fn test_repeat_request_with_nothing_stored_is_empty() {
    let index = StaticIndex::new();
    let store = MemoryStore::new();

    let response = search(&index, &store, &request("never searched", 0, false))
        .await
        .unwrap();

    assert_eq!(response.current_page, 0);
    assert_eq!(response.total_pages, 0);
    assert!(response.dockets.is_empty());
}

#[tokio::test]
async fn test_repeat_request_refilters_missing_dockets() {
    let store = MemoryStore::new();
    store.insert_docket("D1", Some("Still here"), Some(Utc::now()), None, None);

    // A previously stored set referencing a docket that no longer has a
    // relational row.
    let mut gone = EnrichedDocket::from_match(DocketMatch {
        docket_id: "D-GONE".to_string(),
        comments: FieldCounts { matched: 5, total: 5 },
        attachments: FieldCounts::default(),
    });
    gone.search_rank = 0;
    let mut kept = EnrichedDocket::from_match(DocketMatch {
        docket_id: "D1".to_string(),
        comments: FieldCounts { matched: 1, total: 5 },
        attachments: FieldCounts::default(),
    });
    kept.search_rank = 1;

    let req = request("term", 0, false);
    let fp = QueryFingerprint::from_request(&req);
    store.store_results(&fp, &[gone, kept], 100).await.unwrap();

    let response = search(&StaticIndex::new(), &store, &req).await.unwrap();
    assert_eq!(response.total_pages, 1);
    assert_eq!(response.dockets.len(), 1);
    assert_eq!(response.dockets[0].docket_id, "D1");
    assert_eq!(response.dockets[0].search_rank, 1);
}
