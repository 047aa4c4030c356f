//! # Docket Search Core
//!
//! Shared logic for the docket search pipeline: request/response models,
//! per-field match aggregation, relational enrichment passes, relevance
//! ranking, pagination, and the store/index traits the application crate
//! implements.
//!
//! This crate contains no tokio, sqlx, network, or other native-only
//! dependencies. Everything asynchronous goes through `async-trait` seams,
//! so backends stay pluggable and the whole pipeline runs against in-memory
//! implementations in tests.

pub mod aggregate;
pub mod enrich;
pub mod error;
pub mod index;
pub mod models;
pub mod page;
pub mod rank;
pub mod search;
pub mod store;
