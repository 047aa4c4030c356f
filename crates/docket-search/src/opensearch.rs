//! OpenSearch-backed implementation of the search index.
//!
//! Talks to the cluster over HTTP with `reqwest` and basic auth. Each
//! field lookup is a single terms aggregation on `docketId.keyword` with
//! a `match_phrase` filter sub-aggregation on the field being searched,
//! so the cluster returns per-docket totals and match counts without
//! fetching any documents.
//!
//! Construction pings the cluster root and fails fast when it is
//! unreachable; aggregation queries make a single attempt, since an index
//! failure is fatal to the whole search request.

use async_trait::async_trait;
use docket_search_core::error::{Result, SearchError};
use docket_search_core::index::{SearchField, SearchIndex};
use docket_search_core::models::FieldCounts;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::Config;
use crate::credentials::OpenSearchCredentials;

/// Terms-aggregation bucket ceiling; sized well above the number of
/// distinct dockets in the corpus.
const BUCKET_LIMIT: u64 = 1_000_000;

/// HTTP client for the OpenSearch cluster.
pub struct OpenSearchClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl OpenSearchClient {
    /// Build a client from config and resolved credentials and verify the
    /// cluster responds.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailure` if the HTTP client cannot be built or
    /// the cluster does not answer the initial ping.
    pub async fn connect(config: &Config, credentials: &OpenSearchCredentials) -> Result<Self> {
        let scheme = if config.opensearch.use_tls { "https" } else { "http" };
        let base_url = format!("{}://{}:{}", scheme, credentials.host, credentials.port);

        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.opensearch.timeout_secs));

        // Local clusters ship with self-signed certificates.
        if !config.opensearch.verify_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(SearchError::connection)?;

        let client = Self {
            http,
            base_url,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };

        client.ping().await?;
        Ok(client)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.base_url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(SearchError::connection)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::connection(format!(
                "cluster at {} returned {}",
                self.base_url, status
            )));
        }

        tracing::debug!(cluster = %self.base_url, "opensearch cluster reachable");
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for OpenSearchClient {
    async fn aggregate_matches(
        &self,
        term: &str,
        field: SearchField,
    ) -> Result<HashMap<String, FieldCounts>> {
        let url = format!("{}/{}/_search", self.base_url, field.index());
        let body = aggregation_body(term, field);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(SearchError::connection)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SearchError::retrieval(
                "match aggregation",
                format!("{} returned {}: {}", field.index(), status, body_text),
            ));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::retrieval("match aggregation", e))?;

        parse_buckets(&json)
    }
}

/// Build the aggregation request body for one field.
fn aggregation_body(term: &str, field: SearchField) -> serde_json::Value {
    let field_name = field.field();
    serde_json::json!({
        "size": 0,
        "aggs": {
            "docketId_stats": {
                "terms": {
                    // .keyword for exact grouping on a text-mapped field
                    "field": "docketId.keyword",
                    "size": BUCKET_LIMIT
                },
                "aggs": {
                    "matching_comments": {
                        "filter": {
                            "match_phrase": {
                                field_name: term
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Parse the aggregation response into per-docket counts.
///
/// Extracts `aggregations.docketId_stats.buckets[]`, reading `key` as the
/// docket id, `doc_count` as the field total, and
/// `matching_comments.doc_count` as the match count.
fn parse_buckets(json: &serde_json::Value) -> Result<HashMap<String, FieldCounts>> {
    let buckets = json
        .get("aggregations")
        .and_then(|a| a.get("docketId_stats"))
        .and_then(|s| s.get("buckets"))
        .and_then(|b| b.as_array())
        .ok_or_else(|| {
            SearchError::retrieval("match aggregation", "response missing docketId_stats buckets")
        })?;

    let mut counts = HashMap::with_capacity(buckets.len());

    for bucket in buckets {
        let key = bucket
            .get("key")
            .and_then(|k| k.as_str())
            .ok_or_else(|| SearchError::retrieval("match aggregation", "bucket missing key"))?;

        let total = bucket.get("doc_count").and_then(|c| c.as_i64()).unwrap_or(0);
        let matched = bucket
            .get("matching_comments")
            .and_then(|m| m.get("doc_count"))
            .and_then(|c| c.as_i64())
            .unwrap_or(0);

        counts.insert(key.to_string(), FieldCounts { matched, total });
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_body_binds_field_and_term() {
        let body = aggregation_body("National", SearchField::CommentText);

        assert_eq!(body["size"], 0);
        assert_eq!(
            body["aggs"]["docketId_stats"]["terms"]["field"],
            "docketId.keyword"
        );
        assert_eq!(
            body["aggs"]["docketId_stats"]["aggs"]["matching_comments"]["filter"]["match_phrase"]
                ["commentText"],
            "National"
        );
    }

    #[test]
    fn test_aggregation_body_attachment_field() {
        let body = aggregation_body("water", SearchField::AttachmentText);

        assert_eq!(
            body["aggs"]["docketId_stats"]["aggs"]["matching_comments"]["filter"]["match_phrase"]
                ["extractedText"],
            "water"
        );
    }

    #[test]
    fn test_parse_buckets() {
        let json = serde_json::json!({
            "took": 3,
            "aggregations": {
                "docketId_stats": {
                    "buckets": [
                        {
                            "key": "USTR-2015-0010",
                            "doc_count": 10,
                            "matching_comments": { "doc_count": 3 }
                        },
                        {
                            "key": "DEA-2016-0015",
                            "doc_count": 4,
                            "matching_comments": { "doc_count": 0 }
                        }
                    ]
                }
            }
        });

        let counts = parse_buckets(&json).unwrap();

        assert_eq!(
            counts["USTR-2015-0010"],
            FieldCounts {
                matched: 3,
                total: 10
            }
        );
        assert_eq!(
            counts["DEA-2016-0015"],
            FieldCounts {
                matched: 0,
                total: 4
            }
        );
    }

    #[test]
    fn test_parse_buckets_empty() {
        let json = serde_json::json!({
            "aggregations": { "docketId_stats": { "buckets": [] } }
        });

        assert!(parse_buckets(&json).unwrap().is_empty());
    }

    #[test]
    fn test_parse_buckets_missing_aggregation_is_error() {
        let json = serde_json::json!({ "hits": { "total": { "value": 0 } } });

        let err = parse_buckets(&json).unwrap_err();
        assert!(err.to_string().contains("docketId_stats"));
    }
}
