//! Equality filters for issue queries.
//!
//! A filter is a conjunction of exact-match terms. Client field names that
//! do not name an issue field, and values that cannot be read as the field's
//! type, make the whole filter unmatchable instead of failing the request.

use crate::model::{FieldMap, Issue, IssueField};
use crate::util::{parse_bool, parse_exact_timestamp};
use chrono::{DateTime, Utc};

/// A single equality constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// A string-typed field equals the value exactly.
    Text { field: IssueField, value: String },
    /// `open` equals the flag.
    Open(bool),
    /// `created_on` or `updated_on` equals the instant.
    Timestamp { field: IssueField, at: DateTime<Utc> },
}

impl FilterTerm {
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        match self {
            Self::Text { field, value } => issue.text(*field) == Some(value.as_str()),
            Self::Open(open) => issue.open == *open,
            Self::Timestamp { field, at } => issue.timestamp(*field) == Some(*at),
        }
    }
}

/// Filter applied by `find_many`. The default filter matches every issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    terms: Vec<FilterTerm>,
    unmatchable: bool,
}

impl IssueFilter {
    /// A filter that matches every issue in the project.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from client-supplied query fields.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self::from_pairs(fields.iter())
    }

    /// Build a filter from raw name/value pairs. A repeated name adds one
    /// term per value.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .fold(Self::all(), |filter, (name, value)| {
                filter.with(name.as_ref(), value.as_ref())
            })
    }

    /// Add an equality constraint for a client field name.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        match term_for(name, value) {
            Some(term) => self.terms.push(term),
            None => self.unmatchable = true,
        }
        self
    }

    #[must_use]
    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// True when some constraint can never hold, so the result is empty.
    #[must_use]
    pub const fn is_unmatchable(&self) -> bool {
        self.unmatchable
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && !self.unmatchable
    }

    /// Evaluate the filter against an issue in memory.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        !self.unmatchable && self.terms.iter().all(|term| term.matches(issue))
    }
}

fn term_for(name: &str, value: &str) -> Option<FilterTerm> {
    let field = IssueField::from_name(name)?;
    match field {
        IssueField::Open => parse_bool(value).map(FilterTerm::Open),
        IssueField::CreatedOn | IssueField::UpdatedOn => {
            parse_exact_timestamp(value).map(|at| FilterTerm::Timestamp { field, at })
        }
        _ => Some(FilterTerm::Text {
            field,
            value: value.to_string(),
        }),
    }
}
