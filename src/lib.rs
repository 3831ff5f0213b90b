//! `issue_tracker` - project-scoped issue tracking over HTTP.
//!
//! The request handler in [`handler`] is the heart of the crate: it turns
//! client-supplied fields into validated inserts, equality filters, partial
//! updates and deletes against an injected [`storage::RecordStore`]. The
//! [`server`] module exposes it over axum and [`cli`] over the command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod model;
pub mod server;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, ErrorPayload, HandlerError, Result, StructuredError, TrackerError};
pub use handler::IssueHandler;
pub use model::{FieldMap, Issue, IssueField, IssueUpdate, NewIssue};
pub use storage::{IssueFilter, RecordStore, SqliteStorage, SqliteStore, StoreOutcome};
