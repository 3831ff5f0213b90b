//! Query operation.

use super::IssueHandler;
use crate::error::HandlerError;
use crate::model::{FieldMap, Issue};
use crate::storage::IssueFilter;

impl IssueHandler {
    /// List the issues in `project` whose fields equal every supplied value.
    ///
    /// An empty field map lists the whole project. Unknown field names match
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` only when the store fails.
    pub async fn query(
        &self,
        project: &str,
        fields: &FieldMap,
    ) -> Result<Vec<Issue>, HandlerError> {
        self.query_filter(project, &IssueFilter::from_fields(fields)).await
    }

    /// List the issues in `project` matching an already built filter.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` only when the store fails.
    pub async fn query_filter(
        &self,
        project: &str,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>, HandlerError> {
        tracing::debug!(
            project,
            terms = filter.terms().len(),
            unmatchable = filter.is_unmatchable(),
            "Query requested"
        );

        self.store.find_many(project, filter).await.map_err(|e| {
            tracing::error!(project, error = %e, "Store search failed");
            HandlerError::QueryFailed
        })
    }
}
