//! Error taxonomy for the API core.
//!
//! The HTTP boundary flattens every variant into the same `{err, pathname}`
//! envelope with status 500 (preserved wire behavior); the variants are kept
//! distinct here so a stricter status mapping can be retrofitted without
//! touching call sites.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing, or oversized input, including magic-byte mismatches.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, malformed, untrusted, or expired bearer credential.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// A referenced post, user, or asset does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed binary upload frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Key-value store failure.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
