//! Machine-readable failures for the `issues` binary.
//!
//! A [`StructuredError`] carries a stable code, the display message, an
//! optional hint and the echoed `_id` when there is one. The code decides
//! the process exit status.

use crate::error::{HandlerError, TrackerError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable failure categories. [`ErrorCode::as_str`] gives the printed spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Database Errors (exit code 2) ===
    /// SQLite returned an error
    DatabaseError,
    /// Store connection unusable
    StoreUnavailable,

    // === Issue Errors (exit code 3) ===
    /// Update did not apply
    UpdateFailed,
    /// Delete did not apply
    DeleteFailed,

    // === Validation Errors (exit code 4) ===
    /// Required create field missing
    RequiredField,
    /// `_id` missing
    MissingId,
    /// Nothing to update
    EmptyUpdate,

    // === Store Errors (exit code 5) ===
    /// Insert failed in the store
    CreateFailed,
    /// Search failed in the store
    QueryFailed,
    /// Update or delete failed in the store
    StoreFailed,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File or socket I/O error
    IoError,
    /// Output could not be serialized
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Code as written in the `code` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::MissingId => "MISSING_ID",
            Self::EmptyUpdate => "EMPTY_UPDATE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::QueryFailed => "QUERY_FAILED",
            Self::StoreFailed => "STORE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// True when resending a corrected request can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequiredField
                | Self::MissingId
                | Self::EmptyUpdate
                | Self::CreateFailed
                | Self::QueryFailed
        )
    }

    /// Process exit status for the category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Database errors
    /// - 3: Issue errors
    /// - 4: Validation errors
    /// - 5: Store errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseError | Self::StoreUnavailable => 2,
            Self::UpdateFailed | Self::DeleteFailed => 3,
            Self::RequiredField | Self::MissingId | Self::EmptyUpdate => 4,
            Self::CreateFailed | Self::QueryFailed | Self::StoreFailed => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// One failure, ready to print.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Category
    pub code: ErrorCode,
    /// Display text of the underlying error
    pub message: String,
    /// What to try next
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
    /// Extra fields such as the echoed `_id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `TrackerError`.
    #[must_use]
    pub fn from_error(err: &TrackerError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// `{"error": {...}}` document for stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// `Error: ...` line plus an optional `Hint: ...` line.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &TrackerError) -> (ErrorCode, Option<Value>) {
        match err {
            TrackerError::Database(_) => (ErrorCode::DatabaseError, None),
            TrackerError::StorePoisoned | TrackerError::TaskJoin(_) => {
                (ErrorCode::StoreUnavailable, None)
            }
            TrackerError::Config(_) => (ErrorCode::ConfigError, None),
            TrackerError::InvalidConfigValue { key, value, reason } => (
                ErrorCode::ConfigError,
                Some(json!({"key": key, "value": value, "reason": reason})),
            ),
            TrackerError::Request(request) => {
                let context = request.echoed_id().map(|id| json!({"_id": id}));
                (request_code(request), context)
            }
            TrackerError::Io(_) => (ErrorCode::IoError, None),
            TrackerError::Json(_) => (ErrorCode::JsonError, None),
            TrackerError::Yaml(_) => (ErrorCode::YamlError, None),
            TrackerError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}

const fn request_code(err: &HandlerError) -> ErrorCode {
    match err {
        HandlerError::MissingRequiredFields => ErrorCode::RequiredField,
        HandlerError::MissingId => ErrorCode::MissingId,
        HandlerError::EmptyUpdate { .. } => ErrorCode::EmptyUpdate,
        HandlerError::UpdateFailed { .. } => ErrorCode::UpdateFailed,
        HandlerError::DeleteFailed { .. } => ErrorCode::DeleteFailed,
        HandlerError::CreateFailed => ErrorCode::CreateFailed,
        HandlerError::QueryFailed => ErrorCode::QueryFailed,
        HandlerError::UpdateStoreFailed { .. } | HandlerError::DeleteStoreFailed { .. } => {
            ErrorCode::StoreFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::MissingId.as_str(), "MISSING_ID");
        assert_eq!(ErrorCode::DeleteFailed.as_str(), "DELETE_FAILED");
        assert_eq!(ErrorCode::ConfigError.as_str(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_code_exit_codes() {
        assert_eq!(ErrorCode::InternalError.exit_code(), 1);
        assert_eq!(ErrorCode::DatabaseError.exit_code(), 2);
        assert_eq!(ErrorCode::UpdateFailed.exit_code(), 3);
        assert_eq!(ErrorCode::EmptyUpdate.exit_code(), 4);
        assert_eq!(ErrorCode::QueryFailed.exit_code(), 5);
        assert_eq!(ErrorCode::ConfigError.exit_code(), 7);
        assert_eq!(ErrorCode::YamlError.exit_code(), 8);
    }

    #[test]
    fn test_structured_error_from_request() {
        let err = TrackerError::Request(HandlerError::UpdateFailed {
            id: "658b17841a1fe2cbc76c7847".to_string(),
        });
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, ErrorCode::UpdateFailed);
        assert_eq!(structured.message, "could not update");
        assert!(!structured.retryable);

        let json = structured.to_json();
        assert_eq!(json["error"]["code"], "UPDATE_FAILED");
        assert_eq!(
            json["error"]["context"]["_id"],
            "658b17841a1fe2cbc76c7847"
        );
    }

    #[test]
    fn test_store_failure_on_delete_exits_5() {
        let err = TrackerError::Request(HandlerError::DeleteStoreFailed {
            id: "658b17841a1fe2cbc76c7847".to_string(),
        });
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, ErrorCode::StoreFailed);
        assert_eq!(structured.code.exit_code(), 5);
        assert_eq!(structured.message, "could not delete");
        assert_eq!(
            structured.to_json()["error"]["context"]["_id"],
            "658b17841a1fe2cbc76c7847"
        );
    }

    #[test]
    fn test_structured_error_from_config() {
        let err = TrackerError::invalid_config("lock-timeout", "soon", "expected milliseconds");
        let structured = StructuredError::from_error(&err);
        assert_eq!(structured.code, ErrorCode::ConfigError);
        assert_eq!(structured.context.unwrap()["key"], "lock-timeout");
    }

    #[test]
    fn test_to_human_output() {
        let structured = StructuredError::from_error(&TrackerError::from(HandlerError::MissingId));
        let human = structured.to_human(false);
        assert!(human.starts_with("Error: missing _id"));
        assert!(human.contains("Hint: Provide the _id of the issue"));
    }
}
