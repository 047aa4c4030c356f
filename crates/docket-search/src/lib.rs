//! # Docket Search
//!
//! **Ranked full-text search over regulatory dockets, backed by
//! OpenSearch and Postgres.**
//!
//! Docket Search runs a staged pipeline: a search term is aggregated per
//! docket across the comment and attachment-text indexes, the matching
//! dockets are enriched from a mirrored relational schema, scored and
//! ordered, and the ranked set is persisted under a per-session query
//! fingerprint so repeat requests page through stored rows instead of
//! re-running the aggregation.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌───────────┐
//! │ OpenSearch │──▶│   Pipeline     │◀─▶│ Postgres  │
//! │ comments / │   │ agg → enrich  │   │ dockets + │
//! │ extracted  │   │ → rank → page │   │ results   │
//! └────────────┘   └──────┬────────┘   └───────────┘
//!                         │
//!                         ▼
//!                    ┌──────────┐
//!                    │   CLI    │
//!                    │(dockets) │
//!                    └──────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **aggregator** runs one terms aggregation per searchable field
//!    ([`opensearch`]) and merges per-docket `{match, total}` counts
//!    (`docket-search-core::aggregate`).
//! 2. The **enricher** joins docket fields, agency identity, document
//!    counts, timeline dates, and summaries in five single-query passes
//!    (`docket-search-core::enrich` via [`pg_store`]); dockets with no
//!    title record are dropped.
//! 3. The **ranker** scores each docket — comment total × match ratio² ×
//!    exponential recency decay — then orders the full set by matching
//!    count and modification year (`docket-search-core::rank`).
//! 4. The **pager** slices fixed 10-row pages with a 100-result cap
//!    (`docket-search-core::page`).
//! 5. The ranked set is persisted under the request's **query
//!    fingerprint**; a repeat request (`--cached`) rebuilds dockets from
//!    the stored rank/score/count rows and re-attaches presentation
//!    fields with the same enrichment passes.
//!
//! ## Quick Start
//!
//! ```bash
//! dockets init                          # create the schema
//! dockets search "National"             # fresh search, page 0
//! dockets search "National" --page 2    # a later page (fresh)
//! dockets search "National" --cached    # serve from stored results
//! dockets search "National" --json      # machine-readable output
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`credentials`] | `CredentialSource` trait: env and secret-file resolution |
//! | [`db`] | Postgres connection pool from resolved credentials |
//! | [`opensearch`] | Index client: per-docket match aggregations over HTTP |
//! | [`pg_store`] | Postgres implementation of the core `DocketStore` trait |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`search`] | Application search entry points and CLI output |
//!
//! ## Configuration
//!
//! Docket Search is configured via a TOML file (default:
//! `config/dockets.toml`) selecting the credential source and backend
//! settings. See [`config`] for all available options and
//! [`config::load_config`] for validation rules.

pub mod config;
pub mod credentials;
pub mod db;
pub mod migrate;
pub mod opensearch;
pub mod pg_store;
pub mod search;

pub use docket_search_core::error::SearchError;
pub use docket_search_core::models;
