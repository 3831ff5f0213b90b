//! Core data types for `issue_tracker`.
//!
//! - `Issue` - the tracked work item, scoped to a project
//! - `IssueField` - the names clients use for issue fields
//! - `FieldMap` - normalized client-supplied fields
//! - `NewIssue` / `IssueUpdate` - store inputs built by the handler

use crate::util::time::rfc3339_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A tracked work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: String,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    #[serde(with = "rfc3339_millis")]
    pub created_on: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub updated_on: DateTime<Utc>,
    pub open: bool,
}

impl Issue {
    /// Materialize a stored issue from its insert input.
    #[must_use]
    pub fn from_new(id: String, project: &str, new: NewIssue) -> Self {
        Self {
            id,
            project: project.to_string(),
            issue_title: new.issue_title,
            issue_text: new.issue_text,
            created_by: new.created_by,
            assigned_to: new.assigned_to,
            status_text: new.status_text,
            created_on: new.created_on,
            updated_on: new.created_on,
            open: new.open,
        }
    }

    /// Text value of a string-typed field; `None` for `open` and timestamps.
    #[must_use]
    pub fn text(&self, field: IssueField) -> Option<&str> {
        match field {
            IssueField::Id => Some(&self.id),
            IssueField::Project => Some(&self.project),
            IssueField::IssueTitle => Some(&self.issue_title),
            IssueField::IssueText => Some(&self.issue_text),
            IssueField::CreatedBy => Some(&self.created_by),
            IssueField::AssignedTo => Some(&self.assigned_to),
            IssueField::StatusText => Some(&self.status_text),
            IssueField::CreatedOn | IssueField::UpdatedOn | IssueField::Open => None,
        }
    }

    /// Timestamp value of `created_on` / `updated_on`.
    #[must_use]
    pub const fn timestamp(&self, field: IssueField) -> Option<DateTime<Utc>> {
        match field {
            IssueField::CreatedOn => Some(self.created_on),
            IssueField::UpdatedOn => Some(self.updated_on),
            _ => None,
        }
    }
}

/// Issue field names as clients spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueField {
    Id,
    Project,
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
    CreatedOn,
    UpdatedOn,
    Open,
}

impl IssueField {
    pub const ALL: [Self; 10] = [
        Self::Id,
        Self::Project,
        Self::IssueTitle,
        Self::IssueText,
        Self::CreatedBy,
        Self::AssignedTo,
        Self::StatusText,
        Self::CreatedOn,
        Self::UpdatedOn,
        Self::Open,
    ];

    /// Fields a client may change through an update.
    pub const UPDATABLE: [Self; 6] = [
        Self::IssueTitle,
        Self::IssueText,
        Self::CreatedBy,
        Self::AssignedTo,
        Self::StatusText,
        Self::Open,
    ];

    /// Fields that must be non-empty when creating.
    pub const REQUIRED: [Self; 3] = [Self::IssueTitle, Self::IssueText, Self::CreatedBy];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Project => "project",
            Self::IssueTitle => "issue_title",
            Self::IssueText => "issue_text",
            Self::CreatedBy => "created_by",
            Self::AssignedTo => "assigned_to",
            Self::StatusText => "status_text",
            Self::CreatedOn => "created_on",
            Self::UpdatedOn => "updated_on",
            Self::Open => "open",
        }
    }

    /// Storage column backing this field.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            other => other.as_str(),
        }
    }

    /// Look up a field by its client-facing name. Names are case sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    #[must_use]
    pub fn is_updatable(&self) -> bool {
        Self::UPDATABLE.contains(self)
    }
}

impl fmt::Display for IssueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-supplied fields after transport decoding.
///
/// Every value is text: JSON booleans and numbers keep their literal
/// spelling, `null` is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value, including empty strings.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of a field, treating the empty string as absent.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from a decoded JSON body. Non-object bodies carry no fields.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        map.iter()
            .filter_map(|(name, value)| json_field_text(value).map(|text| (name.clone(), text)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn json_field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// A validated issue ready to insert. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub created_on: DateTime<Utc>,
    pub open: bool,
}

/// Fields to change on an existing issue. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
    pub updated_on: Option<DateTime<Utc>>,
}

impl IssueUpdate {
    /// True when no client field is set. `updated_on` does not count.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Text changes in column order, for building `SET` clauses.
    #[must_use]
    pub fn text_changes(&self) -> Vec<(IssueField, &str)> {
        [
            (IssueField::IssueTitle, &self.issue_title),
            (IssueField::IssueText, &self.issue_text),
            (IssueField::CreatedBy, &self.created_by),
            (IssueField::AssignedTo, &self.assigned_to),
            (IssueField::StatusText, &self.status_text),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Names of the fields this update touches.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<IssueField> {
        let mut fields: Vec<IssueField> =
            self.text_changes().into_iter().map(|(f, _)| f).collect();
        if self.open.is_some() {
            fields.push(IssueField::Open);
        }
        fields
    }

    /// Apply this update to an issue in memory.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref v) = self.issue_title {
            issue.issue_title.clone_from(v);
        }
        if let Some(ref v) = self.issue_text {
            issue.issue_text.clone_from(v);
        }
        if let Some(ref v) = self.created_by {
            issue.created_by.clone_from(v);
        }
        if let Some(ref v) = self.assigned_to {
            issue.assigned_to.clone_from(v);
        }
        if let Some(ref v) = self.status_text {
            issue.status_text.clone_from(v);
        }
        if let Some(open) = self.open {
            issue.open = open;
        }
        if let Some(updated_on) = self.updated_on {
            issue.updated_on = updated_on.max(issue.created_on);
        }
    }
}
