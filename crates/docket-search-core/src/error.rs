//! Error taxonomy for the search pipeline.
//!
//! Only conditions that abort a request are represented as variants.
//! Per-docket scoring problems degrade to a zero score and stored-result
//! write problems are logged and tolerated; neither surfaces as an error
//! value.

use thiserror::Error;

/// A failure that aborts the current search request.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search index or the relational store could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A query executed but a retrieval step could not complete.
    #[error("retrieval failed during {pass}: {message}")]
    Retrieval {
        /// Name of the pipeline step that failed.
        pass: &'static str,
        message: String,
    },
}

impl SearchError {
    /// Wrap a lower-level error as a connection failure.
    pub fn connection(err: impl std::fmt::Display) -> Self {
        SearchError::Connection(err.to_string())
    }

    /// Wrap a lower-level error as a retrieval failure in the named step.
    pub fn retrieval(pass: &'static str, err: impl std::fmt::Display) -> Self {
        SearchError::Retrieval {
            pass,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
