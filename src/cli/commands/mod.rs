//! Command implementations.
//!
//! The CRUD commands run the same [`IssueHandler`] as the HTTP service
//! against the configured database.

pub mod create;
pub mod delete;
pub mod list;
pub mod serve;
pub mod update;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::handler::IssueHandler;
use crate::model::Issue;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Open the configured store and wrap it in a handler.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub fn open_handler(config: &ServiceConfig) -> Result<IssueHandler> {
    let store = config.open_store()?;
    Ok(IssueHandler::new(Arc::new(store)))
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line human summary of an issue.
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    let state = if issue.open { "open" } else { "closed" };
    let mut line = format!("{}  [{state}]  {}", issue.id, issue.issue_title);
    if !issue.assigned_to.is_empty() {
        let _ = write!(line, "  @{}", issue.assigned_to);
    }
    if !issue.status_text.is_empty() {
        let _ = write!(line, "  ({})", issue.status_text);
    }
    line
}
