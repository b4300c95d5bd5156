//! Error type shared by every client operation.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client.
///
/// Nothing in this crate panics or exits on I/O failure; every failure ends up
/// here and is handed back to the caller. No operation retries on its own.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The coordination service could not be reached or refused the request.
    #[error("coordination service error: {0}")]
    Connection(String),

    /// Discovery succeeded but no live nodes are registered.
    #[error("no live nodes registered under {0}")]
    NoLiveNodes(String),

    /// The operation did not complete within its timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The HTTP transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body or value could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A document failed validation (for example a missing `id`).
    #[error("invalid document: {0}")]
    Validation(String),

    /// A document does not contain the requested field.
    #[error("document {id} does not contain field {field}")]
    FieldNotFound {
        /// Identity of the document.
        id: String,
        /// Name of the missing field.
        field: String,
    },

    /// A typed accessor was used against a value of a different kind.
    #[error("field {field} holds {found}, expected {expected}")]
    TypeMismatch {
        /// Name of the field.
        field: String,
        /// Kind the caller asked for.
        expected: &'static str,
        /// Kind actually stored.
        found: &'static str,
    },

    /// The collections API reported that the collection already exists.
    #[error("collection {0} already exists")]
    CollectionExists(String),

    /// Solr answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl Error {
    /// Short, stable name of the error kind, suitable for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::NoLiveNodes(_) => "no_live_nodes",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::FieldNotFound { .. } => "field_not_found",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::CollectionExists(_) => "collection_exists",
            Self::RequestFailed { .. } => "request_failed",
        }
    }
}
