//! `SQLite` storage implementation.

use crate::error::{Result, TrackerError};
use crate::model::{Issue, IssueField, IssueUpdate, NewIssue};
use crate::storage::StoreOutcome;
use crate::storage::filter::{FilterTerm, IssueFilter};
use crate::storage::schema::apply_schema;
use crate::util::{IdGenerator, format_timestamp, is_valid_id_format, now_millis, parse_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

const ISSUE_COLUMNS: &str = "id, project, issue_title, issue_text, created_by, assigned_to, \
                             status_text, open, created_on, updated_on";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "Opened issue database");
        Ok(Self { conn })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run `f` inside an `IMMEDIATE` transaction.
    ///
    /// The transaction commits only if `f` succeeds; otherwise it is rolled
    /// back when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `f` fails or the transaction cannot be started or committed.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        tracing::trace!(op, "Committed mutation");
        Ok(result)
    }

    /// Insert a new issue, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or no free id could be generated.
    pub fn create_issue(&mut self, project: &str, new: NewIssue) -> Result<Issue> {
        self.mutate("create_issue", |tx| {
            let last_seq: Option<i64> = tx
                .query_row(
                    "SELECT seq FROM sqlite_sequence WHERE name = 'issues'",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            let seq = last_seq.unwrap_or(0) + 1;

            let mut lookup_error = None;
            let id = IdGenerator::new().generate(project, seq, new.created_on, |candidate| {
                match id_exists_in(tx, candidate) {
                    Ok(exists) => exists,
                    Err(e) => {
                        lookup_error.get_or_insert(e);
                        true
                    }
                }
            });
            if let Some(e) = lookup_error {
                return Err(e);
            }
            let id = id.ok_or_else(|| {
                TrackerError::Other(anyhow::anyhow!("no free issue id for sequence {seq}"))
            })?;

            let created_on = format_timestamp(&new.created_on);
            tx.execute(
                "INSERT INTO issues (
                    seq, id, project, issue_title, issue_text, created_by,
                    assigned_to, status_text, open, created_on, updated_on
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    seq,
                    id,
                    project,
                    new.issue_title,
                    new.issue_text,
                    new.created_by,
                    new.assigned_to,
                    new.status_text,
                    new.open,
                    created_on,
                    created_on,
                ],
            )?;

            Ok(Issue::from_new(id, project, new))
        })
    }

    /// Get an issue by ID within a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, project: &str, id: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE project = ? AND id = ?");
        let issue = self
            .conn
            .query_row(&sql, [project, id], issue_from_row)
            .optional()?;
        Ok(issue)
    }

    /// List a project's issues matching a filter, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>> {
        if filter.is_unmatchable() {
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE project = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(project.to_string())];

        // Column names come from `IssueField`, never from the client.
        for term in filter.terms() {
            match term {
                FilterTerm::Text { field, value } => {
                    let _ = write!(sql, " AND {} = ?", field.column());
                    params.push(Box::new(value.clone()));
                }
                FilterTerm::Open(open) => {
                    sql.push_str(" AND open = ?");
                    params.push(Box::new(*open));
                }
                FilterTerm::Timestamp { field, at } => {
                    let _ = write!(sql, " AND {} = ?", field.column());
                    params.push(Box::new(format_timestamp(at)));
                }
            }
        }

        sql.push_str(" ORDER BY seq ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Apply an update to one issue in a project.
    ///
    /// `updated_on` never moves before `created_on`, even if the clock steps back.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_issue(
        &mut self,
        project: &str,
        id: &str,
        updates: &IssueUpdate,
    ) -> Result<StoreOutcome> {
        if !is_valid_id_format(id) {
            return Ok(StoreOutcome::MalformedId);
        }

        self.mutate("update_issue", |tx| {
            let mut set_clauses: Vec<String> = vec![];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

            for (field, value) in updates.text_changes() {
                set_clauses.push(format!("{} = ?", field.column()));
                params.push(Box::new(value.to_string()));
            }
            if let Some(open) = updates.open {
                set_clauses.push(format!("{} = ?", IssueField::Open.column()));
                params.push(Box::new(open));
            }

            // Always update updated_on
            let updated_on = updates.updated_on.unwrap_or_else(now_millis);
            set_clauses.push("updated_on = MAX(created_on, ?)".to_string());
            params.push(Box::new(format_timestamp(&updated_on)));

            let sql = format!(
                "UPDATE issues SET {} WHERE project = ? AND id = ?",
                set_clauses.join(", ")
            );
            params.push(Box::new(project.to_string()));
            params.push(Box::new(id.to_string()));

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(AsRef::as_ref).collect();
            let changed = tx.execute(&sql, params_refs.as_slice())?;

            Ok(if changed == 0 {
                StoreOutcome::NotFound
            } else {
                StoreOutcome::Applied
            })
        })
    }

    /// Permanently delete an issue from a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_issue(&mut self, project: &str, id: &str) -> Result<StoreOutcome> {
        if !is_valid_id_format(id) {
            return Ok(StoreOutcome::MalformedId);
        }

        self.mutate("delete_issue", |tx| {
            let deleted = tx.execute(
                "DELETE FROM issues WHERE project = ? AND id = ?",
                [project, id],
            )?;
            Ok(if deleted == 0 {
                StoreOutcome::NotFound
            } else {
                StoreOutcome::Applied
            })
        })
    }

    /// Check if an issue ID exists in any project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn id_exists(&self, id: &str) -> Result<bool> {
        id_exists_in(&self.conn, id)
    }

    /// Count issues in a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_issues(&self, project: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM issues WHERE project = ?",
            [project],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn id_exists_in(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT count(*) FROM issues WHERE id = ?", [id], |row| {
        row.get(0)
    })?;
    Ok(count > 0)
}

fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        project: row.get(1)?,
        issue_title: row.get(2)?,
        issue_text: row.get(3)?,
        created_by: row.get(4)?,
        assigned_to: row.get(5)?,
        status_text: row.get(6)?,
        open: row.get(7)?,
        created_on: timestamp_column(row, 8)?,
        updated_on: timestamp_column(row, 9)?,
    })
}

fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid timestamp: {text}").into(),
        )
    })
}
