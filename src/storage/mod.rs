//! Issue persistence.
//!
//! [`RecordStore`] is the capability the request handler depends on. The
//! `SQLite` backend implements it by running [`SqliteStorage`] calls on the
//! blocking thread pool.

pub mod filter;
pub mod schema;
pub mod sqlite;

pub use filter::{FilterTerm, IssueFilter};
pub use sqlite::SqliteStorage;

use crate::error::{Result, TrackerError};
use crate::model::{Issue, IssueUpdate, NewIssue};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Result of addressing a single issue by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The change was applied.
    Applied,
    /// No issue with that id exists in the project.
    NotFound,
    /// The id is not shaped like an issue id.
    MalformedId,
}

/// Persistence capability used by the request handler.
///
/// Every method is one store round trip. Implementations provide
/// read-your-writes per project and atomic single-record update and delete.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert an issue, assigning its id. Timestamps are kept as provided.
    async fn insert(&self, project: &str, issue: NewIssue) -> Result<Issue>;

    /// All issues in a project matching the filter, in insertion order.
    async fn find_many(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Apply an update to one issue.
    async fn update_by_id(&self, project: &str, id: &str, update: &IssueUpdate)
    -> Result<StoreOutcome>;

    /// Remove one issue permanently.
    async fn delete_by_id(&self, project: &str, id: &str) -> Result<StoreOutcome>;
}

/// [`RecordStore`] backed by a single `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    storage: Arc<Mutex<SqliteStorage>>,
}

impl SqliteStore {
    #[must_use]
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Open the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        SqliteStorage::open_with_timeout(path, lock_timeout_ms).map(Self::new)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn open_memory() -> Result<Self> {
        SqliteStorage::open_memory().map(Self::new)
    }

    async fn with_storage<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut SqliteStorage) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || {
            let mut guard = storage.lock().map_err(|_| TrackerError::StorePoisoned)?;
            f(&mut guard)
        })
        .await?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, project: &str, issue: NewIssue) -> Result<Issue> {
        let project = project.to_string();
        self.with_storage(move |storage| storage.create_issue(&project, issue))
            .await
    }

    async fn find_many(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let project = project.to_string();
        let filter = filter.clone();
        self.with_storage(move |storage| storage.list_issues(&project, &filter))
            .await
    }

    async fn update_by_id(
        &self,
        project: &str,
        id: &str,
        update: &IssueUpdate,
    ) -> Result<StoreOutcome> {
        let project = project.to_string();
        let id = id.to_string();
        let update = update.clone();
        self.with_storage(move |storage| storage.update_issue(&project, &id, &update))
            .await
    }

    async fn delete_by_id(&self, project: &str, id: &str) -> Result<StoreOutcome> {
        let project = project.to_string();
        let id = id.to_string();
        self.with_storage(move |storage| storage.delete_issue(&project, &id))
            .await
    }
}
