//! Error types and handling for `issue_tracker`.
//!
//! Two layers live here:
//!
//! - [`HandlerError`]: the request taxonomy. Every variant maps to a payload
//!   of the form `{"error": <message>, "_id"?: <id>}` and never escapes as a
//!   transport failure.
//! - [`TrackerError`]: ambient failures (database, config, I/O) raised while
//!   opening stores, loading configuration or running the CLI.

mod structured;

pub use structured::{ErrorCode, StructuredError};

use serde::Serialize;
use thiserror::Error;

/// Primary error type for `issue_tracker` plumbing.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Storage Errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A previous holder of the store connection panicked.
    #[error("Store connection is poisoned")]
    StorePoisoned,

    /// A blocking store task failed to complete.
    #[error("Store task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration key carried a value of the wrong shape.
    #[error("Invalid value for '{key}': {value} ({reason})")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    // === Request Errors ===
    /// A request was answered with an error payload.
    #[error(transparent)]
    Request(#[from] HandlerError),

    // === I/O Errors ===
    /// File system or socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackerError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfigValue { .. } | Self::Config(_) => {
                Some("Check issues.yaml and ISSUES_* environment variables")
            }
            Self::StorePoisoned => Some("Restart the service"),
            Self::Request(err) => err.suggestion(),
            _ => None,
        }
    }

    /// Create an invalid-value config error.
    #[must_use]
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfigValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Request-level failures produced by the issue handler.
///
/// The display strings are part of the wire contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Create was missing `issue_title`, `issue_text` or `created_by`.
    #[error("required field(s) missing")]
    MissingRequiredFields,

    /// Update or delete arrived without a usable `_id`.
    #[error("missing _id")]
    MissingId,

    /// Update carried an `_id` but nothing to change.
    #[error("no update field(s) sent")]
    EmptyUpdate { id: String },

    /// The id did not resolve, was malformed, or `open` was not a boolean.
    #[error("could not update")]
    UpdateFailed { id: String },

    /// The id did not resolve or was malformed.
    #[error("could not delete")]
    DeleteFailed { id: String },

    /// The store failed while updating. Same message as `UpdateFailed`.
    #[error("could not update")]
    UpdateStoreFailed { id: String },

    /// The store failed while deleting. Same message as `DeleteFailed`.
    #[error("could not delete")]
    DeleteStoreFailed { id: String },

    /// The store failed while inserting.
    #[error("could not create")]
    CreateFailed,

    /// The store failed while searching.
    #[error("could not query")]
    QueryFailed,
}

impl HandlerError {
    /// The identifier echoed back alongside the error message, if any.
    #[must_use]
    pub fn echoed_id(&self) -> Option<&str> {
        match self {
            Self::EmptyUpdate { id }
            | Self::UpdateFailed { id }
            | Self::DeleteFailed { id }
            | Self::UpdateStoreFailed { id }
            | Self::DeleteStoreFailed { id } => Some(id),
            _ => None,
        }
    }

    /// Whether the client can fix this by changing the request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredFields | Self::MissingId | Self::EmptyUpdate { .. }
        )
    }

    /// Whether the request named an issue that is not there.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. } | Self::DeleteFailed { .. })
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MissingRequiredFields => {
                Some("Provide issue_title, issue_text and created_by")
            }
            Self::MissingId => Some("Provide the _id of the issue"),
            Self::EmptyUpdate { .. } => Some("Send at least one non-empty field to change"),
            Self::UpdateFailed { .. } | Self::DeleteFailed { .. } => {
                Some("List the project's issues to find a valid _id")
            }
            Self::CreateFailed
            | Self::QueryFailed
            | Self::UpdateStoreFailed { .. }
            | Self::DeleteStoreFailed { .. } => None,
        }
    }

    /// The `{error, _id?}` body returned to clients.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            id: self.echoed_id().map(str::to_string),
        }
    }
}

/// Wire form of a [`HandlerError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
