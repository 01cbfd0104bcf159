//! Error kinds for the ingestion and query pipelines.
//!
//! Each variant corresponds to one failure class with its own propagation
//! policy:
//!
//! - [`Error::Validation`] — rejected before any side effect.
//! - [`Error::Ingestion`] — aborts the remaining chunk stream for the
//!   document; chunks already stored are not rolled back.
//! - [`Error::Embedding`] — swallowed per chunk during ingestion (the chunk
//!   is stored without a vector); fatal only when a caller requires ranking.
//! - [`Error::Generation`] — aborts the current query request.
//! - [`Error::Store`] — aborts the current request; no retry is attempted.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed request input (query, document, scope, sender).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unreadable or corrupt document, or a partition failure.
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// Embedding backend unavailable or returned no usable vector.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// LLM backend unavailable, over input length, or empty response.
    #[error("generation error: {0}")]
    Generation(String),

    /// Underlying content store failure.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn ingestion(msg: impl Into<String>) -> Self {
        Error::Ingestion(msg.into())
    }
}
