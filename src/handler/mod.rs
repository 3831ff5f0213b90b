//! The issue request handler.
//!
//! Each operation takes a project and normalized client fields, runs its
//! validation rules, makes exactly one store call and shapes the result.
//! Every failure is a [`HandlerError`]; nothing here returns a transport
//! error.
//!
//! [`HandlerError`]: crate::error::HandlerError

mod create;
mod delete;
mod query;
mod update;

#[cfg(test)]
pub(crate) mod testing;

use crate::storage::RecordStore;
use serde::Serialize;
use std::sync::Arc;

/// Result text of a successful update.
pub const UPDATED: &str = "successfully updated";
/// Result text of a successful delete.
pub const DELETED: &str = "successfully deleted";

/// Handles issue requests against an injected store.
///
/// Holds no mutable state, so clones can serve requests concurrently.
#[derive(Clone)]
pub struct IssueHandler {
    store: Arc<dyn RecordStore>,
}

impl IssueHandler {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for IssueHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueHandler").finish_non_exhaustive()
    }
}

/// Body of a successful update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

impl Confirmation {
    #[must_use]
    pub const fn updated(id: String) -> Self {
        Self {
            result: UPDATED,
            id,
        }
    }

    #[must_use]
    pub const fn deleted(id: String) -> Self {
        Self {
            result: DELETED,
            id,
        }
    }
}
