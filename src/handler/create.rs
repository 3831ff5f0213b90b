//! Create operation.

use super::IssueHandler;
use crate::error::HandlerError;
use crate::model::{FieldMap, Issue};
use crate::util::now_millis;
use crate::validation::IssueValidator;

impl IssueHandler {
    /// Create an issue in `project` from client fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredFields` without touching the store when a
    /// required field is absent or empty, and `CreateFailed` when the store
    /// insert fails.
    pub async fn create(&self, project: &str, fields: &FieldMap) -> Result<Issue, HandlerError> {
        tracing::debug!(project, fields = fields.len(), "Create requested");

        let new = IssueValidator::validate_create(fields, now_millis()).inspect_err(|e| {
            tracing::warn!(project, error = %e, "Rejected create");
        })?;

        match self.store.insert(project, new).await {
            Ok(issue) => {
                tracing::info!(project, id = %issue.id, "Created issue");
                Ok(issue)
            }
            Err(e) => {
                tracing::error!(project, error = %e, "Store insert failed");
                Err(HandlerError::CreateFailed)
            }
        }
    }
}
