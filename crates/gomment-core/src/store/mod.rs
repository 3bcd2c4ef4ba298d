//! SQLite-backed comment store.
//!
//! One [`CommentStore`] owns one connection. Concurrent workers open their own
//! store on the same database file; SQLite serializes the writers.

mod create;
mod migrate;
mod more;
mod nbf;
mod xsf;

pub use migrate::SCHEMA_VERSION;

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{CoreError, CoreResult, StorageContext};
use crate::model::{Comment, CommentId, CommentRow, Thread, ThreadMetaInfo};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Columns selected for every reader-facing comment query, in the order
/// expected by [`comment_from_row`].
const COMMENT_SELECT_FIELDS: &str =
    "comment_id, parent_id, created_at, touched_at, num_children, author, text";

/// Durable store of threads and comments.
#[derive(Debug)]
pub struct CommentStore {
    conn: Connection,
}

impl CommentStore {
    /// Open or create a store at the given path and bring its schema up to date.
    ///
    /// Creates parent directories if they don't exist, failing with
    /// [`CoreError::Io`] when that is not possible. Fails with
    /// [`CoreError::Migration`] if the schema cannot be migrated; no store is
    /// returned in that case.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| CoreError::Io {
                    context: "failed to create parent directories",
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path).storage("failed to open database")?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .storage("failed to set busy timeout")?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .storage("failed to enable WAL journal mode")?;

        tracing::debug!(path = %path.display(), "opened comment database");
        Self::setup(conn)
    }

    /// Create an in-memory store, mostly useful for tests.
    pub fn open_in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory().storage("failed to open in-memory database")?;
        Self::setup(conn)
    }

    fn setup(conn: Connection) -> CoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .storage("failed to enable foreign keys")?;
        migrate::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version stored in the database.
    pub fn schema_version(&self) -> CoreResult<u32> {
        migrate::schema_version(&self.conn)
    }

    /// Counters of the thread at `path`.
    ///
    /// A thread nobody ever posted to is a valid empty state: the zero value is
    /// returned instead of an error.
    pub fn get_thread_meta_info(&self, path: &str) -> CoreResult<ThreadMetaInfo> {
        let meta = self
            .conn
            .query_row(
                "SELECT thread_id, num_total, num_root FROM thread WHERE path = ?1",
                params![path],
                |row| {
                    Ok(ThreadMetaInfo {
                        thread_id: row.get(0)?,
                        num_total: row.get(1)?,
                        num_root: row.get(2)?,
                    })
                },
            )
            .optional()
            .storage("failed to query database for thread")?;

        Ok(meta.unwrap_or_default())
    }

    /// All threads in storage order.
    pub fn get_threads(&self) -> CoreResult<Vec<Thread>> {
        let mut stmt = self
            .conn
            .prepare("SELECT thread_id, path, num_total, num_root FROM thread ORDER BY thread_id")
            .storage("failed to prepare thread listing")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Thread {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    num_total: row.get(2)?,
                    num_root: row.get(3)?,
                })
            })
            .storage("failed to query database for threads")?;

        let mut threads = Vec::new();
        for row in rows {
            threads.push(row.storage("failed to read thread row")?);
        }
        Ok(threads)
    }

    /// Every stored column of one comment, `None` if it does not exist.
    pub fn get_comment_row(&self, comment_id: CommentId) -> CoreResult<Option<CommentRow>> {
        self.conn
            .query_row(
                "SELECT comment_id, thread_id, parent_id, num_children, depth_level, verified,
                        created_at, edited_at, touched_at, author, email, text
                 FROM comment WHERE comment_id = ?1",
                params![comment_id],
                |row| {
                    Ok(CommentRow {
                        comment_id: row.get(0)?,
                        thread_id: row.get(1)?,
                        parent_id: row.get(2)?,
                        num_children: row.get(3)?,
                        depth_level: row.get(4)?,
                        verified: row.get(5)?,
                        created_at: row.get(6)?,
                        edited_at: row.get(7)?,
                        touched_at: row.get(8)?,
                        author: row.get(9)?,
                        email: row.get(10)?,
                        text: row.get(11)?,
                    })
                },
            )
            .optional()
            .storage("failed to query comment row")
    }

    /// Run a reader query selecting [`COMMENT_SELECT_FIELDS`] and collect it.
    fn query_comments<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> CoreResult<Vec<Comment>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .storage("failed to prepare comment query")?;
        let rows = stmt
            .query_map(params, comment_from_row)
            .storage("failed to query database for comments")?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row.storage("failed to scan comment row")?);
        }
        Ok(comments)
    }
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        created_at: row.get(2)?,
        touched_at: row.get(3)?,
        num_children: row.get(4)?,
        author: row.get(5)?,
        text: row.get(6)?,
    })
}
