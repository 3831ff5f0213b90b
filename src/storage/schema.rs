//! Database schema definitions.

use rusqlite::{Connection, OptionalExtension, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the issue database.
pub const SCHEMA_SQL: &str = r"
    -- Issues table
    -- seq is AUTOINCREMENT so a deleted row's sequence number is never reused.
    -- That sequence feeds id generation and orders query results.
    CREATE TABLE IF NOT EXISTS issues (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        project TEXT NOT NULL,
        issue_title TEXT NOT NULL DEFAULT '',
        issue_text TEXT NOT NULL DEFAULT '',
        created_by TEXT NOT NULL DEFAULT '',
        assigned_to TEXT NOT NULL DEFAULT '',
        status_text TEXT NOT NULL DEFAULT '',
        open INTEGER NOT NULL DEFAULT 1,
        created_on TEXT NOT NULL,
        updated_on TEXT NOT NULL,
        CHECK (length(id) = 24),
        CHECK (updated_on >= created_on)
    );

    CREATE INDEX IF NOT EXISTS idx_issues_project_seq ON issues(project, seq);

    -- Metadata
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Apply the schema to the database.
///
/// Idempotent: every statement uses `IF NOT EXISTS` and the schema version
/// is only recorded once.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    record_schema_version(conn)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}

/// Read the schema version stored in `metadata`, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn schema_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.and_then(|v| v.parse().ok()))
}

fn record_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', ?)",
        [CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}
