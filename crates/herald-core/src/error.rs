//! Error types for the Herald core.
//!
//! Framework-level errors (registration, binding, execution) live in
//! `herald-framework`.

use thiserror::Error;

/// Errors raised while turning raw data into a [`ResponseDocument`](crate::ResponseDocument).
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The top-level value was not a JSON object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// Name of the JSON type that was found instead.
        found: &'static str,
    },

    /// The payload could not be decoded or converted.
    #[error("failed to decode document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why an update could not be classified.
///
/// A malformed update is not a dispatch failure: classification yields no
/// type and command extraction is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedUpdate {
    /// No key besides the update identifier.
    #[error("update carries no content field")]
    MissingContent,

    /// More than one key besides the update identifier.
    #[error("update carries {} content fields: {}", keys.len(), keys.join(", "))]
    AmbiguousContent {
        /// The competing content keys, in document order.
        keys: Vec<String>,
    },
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
