//! Search-index abstraction.
//!
//! The [`SearchIndex`] trait is the seam between the pipeline and the
//! full-text engine: one term-match aggregation per searchable field,
//! returning per-docket match/total counts. The production OpenSearch
//! client lives in the application crate; [`StaticIndex`] serves canned
//! responses for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FieldCounts;

/// A searchable text field, bound to its index and document field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// Comment body text.
    CommentText,
    /// Text extracted from comment attachments.
    AttachmentText,
}

impl SearchField {
    /// Every field the aggregator queries, in query order.
    pub const ALL: [SearchField; 2] = [SearchField::CommentText, SearchField::AttachmentText];

    /// Name of the index holding this field's documents.
    pub fn index(&self) -> &'static str {
        match self {
            SearchField::CommentText => "comments",
            SearchField::AttachmentText => "comments_extracted_text",
        }
    }

    /// Name of the phrase-matchable document field within the index.
    pub fn field(&self) -> &'static str {
        match self {
            SearchField::CommentText => "commentText",
            SearchField::AttachmentText => "extractedText",
        }
    }
}

/// Abstract full-text index backend.
///
/// Implementations must be `Send + Sync` to work with async runtimes.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run one term-match aggregation over `field`, grouped by docket.
    ///
    /// Returns, for every docket with documents in the field's index, the
    /// count of documents phrase-matching `term` and the total document
    /// count. Any failure here is fatal to the surrounding search request;
    /// there is no degraded partial result.
    async fn aggregate_matches(
        &self,
        term: &str,
        field: SearchField,
    ) -> Result<HashMap<String, FieldCounts>>;
}

/// Canned per-field aggregation responses, for tests and local development.
#[derive(Debug, Default)]
pub struct StaticIndex {
    responses: HashMap<SearchField, HashMap<String, FieldCounts>>,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the aggregation result for one field as `(docket_id, match, total)`
    /// triples.
    pub fn with_field(mut self, field: SearchField, counts: &[(&str, i64, i64)]) -> Self {
        let map = counts
            .iter()
            .map(|(id, matched, total)| {
                (
                    id.to_string(),
                    FieldCounts {
                        matched: *matched,
                        total: *total,
                    },
                )
            })
            .collect();
        self.responses.insert(field, map);
        self
    }
}

#[async_trait]
impl SearchIndex for StaticIndex {
    async fn aggregate_matches(
        &self,
        _term: &str,
        field: SearchField,
    ) -> Result<HashMap<String, FieldCounts>> {
        Ok(self.responses.get(&field).cloned().unwrap_or_default())
    }
}
