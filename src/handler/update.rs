//! Mutate operation.

use super::{Confirmation, IssueHandler};
use crate::error::HandlerError;
use crate::model::FieldMap;
use crate::storage::StoreOutcome;
use crate::util::now_millis;
use crate::validation::IssueValidator;

impl IssueHandler {
    /// Apply the non-empty updatable fields to the issue named by `_id`.
    ///
    /// # Errors
    ///
    /// - `MissingId` when `_id` is absent or empty
    /// - `EmptyUpdate` when no updatable field carries a value
    /// - `UpdateFailed` when the id is malformed or unknown in `project`,
    ///   or `open` is not a boolean
    /// - `UpdateStoreFailed` when the store fails
    pub async fn update(
        &self,
        project: &str,
        fields: &FieldMap,
    ) -> Result<Confirmation, HandlerError> {
        tracing::debug!(project, fields = fields.len(), "Update requested");

        let (id, update) = IssueValidator::validate_update(fields, now_millis()).inspect_err(|e| {
            tracing::warn!(project, id = ?e.echoed_id(), error = %e, "Rejected update");
        })?;

        match self.store.update_by_id(project, &id, &update).await {
            Ok(StoreOutcome::Applied) => {
                tracing::info!(project, id = %id, fields = ?update.changed_fields(), "Updated issue");
                Ok(Confirmation::updated(id))
            }
            Ok(outcome) => {
                tracing::warn!(project, id = %id, ?outcome, "Update did not apply");
                Err(HandlerError::UpdateFailed { id })
            }
            Err(e) => {
                tracing::error!(project, id = %id, error = %e, "Store update failed");
                Err(HandlerError::UpdateStoreFailed { id })
            }
        }
    }
}
