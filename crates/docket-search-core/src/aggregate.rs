//! Per-field match aggregation and merging.
//!
//! One index query runs per searchable field; the per-field mappings are
//! then merged into a single candidate list, keeping each field's counts
//! distinct. Dockets that match in no field at all never enter the
//! pipeline.

use std::collections::HashMap;

use crate::error::Result;
use crate::index::{SearchField, SearchIndex};
use crate::models::{DocketMatch, FieldCounts};

/// Query every searchable field for `term` and merge the results into one
/// [`DocketMatch`] per docket.
///
/// Index failure on any field aborts the whole aggregation.
pub async fn collect_matches<I: SearchIndex>(index: &I, term: &str) -> Result<Vec<DocketMatch>> {
    let comments = index
        .aggregate_matches(term, SearchField::CommentText)
        .await?;
    let attachments = index
        .aggregate_matches(term, SearchField::AttachmentText)
        .await?;
    Ok(merge_fields(comments, attachments))
}

/// Union-merge the two per-field mappings, dropping all-zero dockets.
///
/// A docket present in only one field's mapping carries zero counts for the
/// other field. Ids are visited in sorted order so the candidate list is
/// deterministic before ranking.
pub fn merge_fields(
    comments: HashMap<String, FieldCounts>,
    attachments: HashMap<String, FieldCounts>,
) -> Vec<DocketMatch> {
    let mut ids: Vec<&String> = comments.keys().chain(attachments.keys()).collect();
    ids.sort();
    ids.dedup();

    let mut matches = Vec::new();
    for id in ids {
        let c = comments.get(id).copied().unwrap_or_default();
        let a = attachments.get(id).copied().unwrap_or_default();
        if c.matched == 0 && a.matched == 0 {
            continue;
        }
        matches.push(DocketMatch {
            docket_id: id.clone(),
            comments: c,
            attachments: a,
        });
    }
    matches
}
