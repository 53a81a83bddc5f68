//! Error types for entity store operations

use http::StatusCode;
use pizza_admin_core::{EntityId, EntityKind};
use thiserror::Error;

/// Result type alias for store operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by an entity store
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Requested record does not exist
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity type
        kind: EntityKind,
        /// Missing record id
        id: EntityId,
    },

    /// Backend answered with a non-success status
    #[error("API returned {status}: {message}")]
    Status {
        /// HTTP status
        status: StatusCode,
        /// Response body or reason
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL cannot carry entity paths
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// Offending URL
        url: String,
        /// Parse failure
        message: String,
    },
}

impl ClientError {
    /// Create a status error
    #[must_use]
    pub fn status<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status associated with the error, if any
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) => err.status(),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Status { status, .. } => Some(*status),
            Self::Json(_) | Self::InvalidBaseUrl { .. } => None,
        }
    }

    /// Whether the error means the record is gone
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }
}
