//! Request validation for `issue_tracker`.
//!
//! These routines turn normalized client fields into store inputs and
//! return the request error for the first rule violated, without touching
//! storage. An empty string counts as absent everywhere.

use crate::error::HandlerError;
use crate::model::{FieldMap, IssueField, IssueUpdate, NewIssue};
use crate::util::parse_bool;
use chrono::{DateTime, Utc};

/// Validates issue requests.
pub struct IssueValidator;

impl IssueValidator {
    /// Build a new issue from create fields.
    ///
    /// Optional text fields default to `""` and `open` is always `true`.
    /// Fields outside the five accepted ones are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredFields` if `issue_title`, `issue_text` or
    /// `created_by` is absent or empty.
    pub fn validate_create(
        fields: &FieldMap,
        now: DateTime<Utc>,
    ) -> Result<NewIssue, HandlerError> {
        let required = |field: IssueField| {
            fields
                .non_empty(field.as_str())
                .map(str::to_string)
                .ok_or(HandlerError::MissingRequiredFields)
        };
        let optional = |field: IssueField| {
            fields
                .non_empty(field.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(NewIssue {
            issue_title: required(IssueField::IssueTitle)?,
            issue_text: required(IssueField::IssueText)?,
            created_by: required(IssueField::CreatedBy)?,
            assigned_to: optional(IssueField::AssignedTo),
            status_text: optional(IssueField::StatusText),
            created_on: now,
            open: true,
        })
    }

    /// Validate an update request and return the target id with its change set.
    ///
    /// Rules are checked in order and the first failure wins:
    /// 1. `_id` absent or empty
    /// 2. no updatable field carries a non-empty value
    /// 3. `open` is present but not a boolean
    ///
    /// # Errors
    ///
    /// Returns `MissingId`, `EmptyUpdate` or `UpdateFailed` respectively.
    pub fn validate_update(
        fields: &FieldMap,
        now: DateTime<Utc>,
    ) -> Result<(String, IssueUpdate), HandlerError> {
        let id = Self::require_id(fields)?;

        let has_change = IssueField::UPDATABLE
            .iter()
            .any(|field| fields.non_empty(field.as_str()).is_some());
        if !has_change {
            return Err(HandlerError::EmptyUpdate { id });
        }

        let text = |field: IssueField| fields.non_empty(field.as_str()).map(str::to_string);
        let open = match fields.non_empty(IssueField::Open.as_str()) {
            None => None,
            Some(raw) => match parse_bool(raw) {
                Some(open) => Some(open),
                None => return Err(HandlerError::UpdateFailed { id }),
            },
        };

        let update = IssueUpdate {
            issue_title: text(IssueField::IssueTitle),
            issue_text: text(IssueField::IssueText),
            created_by: text(IssueField::CreatedBy),
            assigned_to: text(IssueField::AssignedTo),
            status_text: text(IssueField::StatusText),
            open,
            updated_on: Some(now),
        };
        Ok((id, update))
    }

    /// Validate a delete request and return the target id.
    ///
    /// # Errors
    ///
    /// Returns `MissingId` if `_id` is absent or empty.
    pub fn validate_delete(fields: &FieldMap) -> Result<String, HandlerError> {
        Self::require_id(fields)
    }

    fn require_id(fields: &FieldMap) -> Result<String, HandlerError> {
        fields
            .non_empty(IssueField::Id.as_str())
            .map(str::to_string)
            .ok_or(HandlerError::MissingId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::now_millis;

    const ID: &str = "658b17841a1fe2cbc76c7847";

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_create_defaults_optional_fields() {
        let now = now_millis();
        let issue = IssueValidator::validate_create(
            &fields(&[
                ("issue_title", "Title"),
                ("issue_text", "Text"),
                ("created_by", "alice"),
                ("open", "false"),
                ("priority", "high"),
            ]),
            now,
        )
        .unwrap();
        assert_eq!(issue.issue_title, "Title");
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "");
        assert!(issue.open);
        assert_eq!(issue.created_on, now);
    }

    #[test]
    fn test_create_requires_each_field() {
        for missing in ["issue_title", "issue_text", "created_by"] {
            let mut map = fields(&[
                ("issue_title", "Title"),
                ("issue_text", "Text"),
                ("created_by", "alice"),
            ]);
            map.insert(missing, "");
            assert_eq!(
                IssueValidator::validate_create(&map, now_millis()),
                Err(HandlerError::MissingRequiredFields),
                "empty {missing}"
            );
        }
        assert_eq!(
            IssueValidator::validate_create(&FieldMap::new(), now_millis()),
            Err(HandlerError::MissingRequiredFields)
        );
    }

    #[test]
    fn test_update_missing_id_wins_over_empty_set() {
        assert_eq!(
            IssueValidator::validate_update(&FieldMap::new(), now_millis()),
            Err(HandlerError::MissingId)
        );
        assert_eq!(
            IssueValidator::validate_update(&fields(&[("_id", ""), ("issue_title", "x")]), now_millis()),
            Err(HandlerError::MissingId)
        );
    }

    #[test]
    fn test_update_empty_set_echoes_id() {
        let result = IssueValidator::validate_update(
            &fields(&[("_id", ID), ("issue_title", ""), ("created_on", "2024-01-01T00:00:00Z")]),
            now_millis(),
        );
        assert_eq!(result, Err(HandlerError::EmptyUpdate { id: ID.to_string() }));
    }

    #[test]
    fn test_update_collects_non_empty_fields() {
        let now = now_millis();
        let (id, update) = IssueValidator::validate_update(
            &fields(&[
                ("_id", ID),
                ("issue_text", "new text"),
                ("assigned_to", ""),
                ("open", "false"),
            ]),
            now,
        )
        .unwrap();
        assert_eq!(id, ID);
        assert_eq!(update.issue_text.as_deref(), Some("new text"));
        assert_eq!(update.assigned_to, None);
        assert_eq!(update.open, Some(false));
        assert_eq!(update.updated_on, Some(now));
    }

    #[test]
    fn test_update_rejects_non_boolean_open() {
        let result = IssueValidator::validate_update(
            &fields(&[("_id", ID), ("open", "maybe")]),
            now_millis(),
        );
        assert_eq!(result, Err(HandlerError::UpdateFailed { id: ID.to_string() }));
    }

    #[test]
    fn test_delete_requires_id() {
        assert_eq!(
            IssueValidator::validate_delete(&FieldMap::new()),
            Err(HandlerError::MissingId)
        );
        assert_eq!(IssueValidator::validate_delete(&fields(&[("_id", ID)])), Ok(ID.to_string()));
    }
}
