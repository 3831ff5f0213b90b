//! Delete operation.

use super::{Confirmation, IssueHandler};
use crate::error::HandlerError;
use crate::model::FieldMap;
use crate::storage::StoreOutcome;
use crate::validation::IssueValidator;

impl IssueHandler {
    /// Permanently delete the issue named by `_id`.
    ///
    /// # Errors
    ///
    /// Returns `MissingId` when `_id` is absent or empty, `DeleteFailed`
    /// when the id is malformed or unknown in `project`, and
    /// `DeleteStoreFailed` when the store fails.
    pub async fn delete(
        &self,
        project: &str,
        fields: &FieldMap,
    ) -> Result<Confirmation, HandlerError> {
        let id = IssueValidator::validate_delete(fields).inspect_err(|e| {
            tracing::warn!(project, error = %e, "Rejected delete");
        })?;
        tracing::debug!(project, id = %id, "Delete requested");

        match self.store.delete_by_id(project, &id).await {
            Ok(StoreOutcome::Applied) => {
                tracing::info!(project, id = %id, "Deleted issue");
                Ok(Confirmation::deleted(id))
            }
            Ok(outcome) => {
                tracing::warn!(project, id = %id, ?outcome, "Delete did not apply");
                Err(HandlerError::DeleteFailed { id })
            }
            Err(e) => {
                tracing::error!(project, id = %id, error = %e, "Store delete failed");
                Err(HandlerError::DeleteStoreFailed { id })
            }
        }
    }
}
