//! Store doubles for handler tests.

use crate::error::{Result, TrackerError};
use crate::handler::IssueHandler;
use crate::model::{FieldMap, Issue, IssueUpdate, NewIssue};
use crate::storage::{IssueFilter, RecordStore, SqliteStore, StoreOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Delegates to an in-memory `SQLite` store and counts every call.
/// With `failing` set, every call errors instead.
pub struct CountingStore {
    inner: SqliteStore,
    calls: AtomicUsize,
    failing: bool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::open_memory().unwrap(),
            calls: AtomicUsize::new(0),
            failing: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::open_memory().unwrap(),
            calls: AtomicUsize::new(0),
            failing: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            Err(TrackerError::StorePoisoned)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn insert(&self, project: &str, issue: NewIssue) -> Result<Issue> {
        self.record()?;
        self.inner.insert(project, issue).await
    }

    async fn find_many(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.record()?;
        self.inner.find_many(project, filter).await
    }

    async fn update_by_id(
        &self,
        project: &str,
        id: &str,
        update: &IssueUpdate,
    ) -> Result<StoreOutcome> {
        self.record()?;
        self.inner.update_by_id(project, id, update).await
    }

    async fn delete_by_id(&self, project: &str, id: &str) -> Result<StoreOutcome> {
        self.record()?;
        self.inner.delete_by_id(project, id).await
    }
}

pub fn handler_with(store: &Arc<CountingStore>) -> IssueHandler {
    IssueHandler::new(Arc::clone(store) as Arc<dyn RecordStore>)
}

pub fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().copied().collect()
}

/// Create an issue through the handler and return it.
pub async fn seed(handler: &IssueHandler, project: &str, title: &str) -> Issue {
    handler
        .create(
            project,
            &fields(&[
                ("issue_title", title),
                ("issue_text", "seeded"),
                ("created_by", "fixture"),
            ]),
        )
        .await
        .unwrap()
}
