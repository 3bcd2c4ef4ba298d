//! Transactional comment creation.

use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

use super::CommentStore;
use crate::errors::{CoreError, CoreResult, StorageContext};
use crate::model::{CommentId, NewComment};

impl CommentStore {
    /// Insert a comment and update every derived counter in one transaction.
    ///
    /// The thread is created on first use. `touched_at` of every ancestor is
    /// raised to `created_at` and the parent's `num_children` grows by one.
    /// Fails with [`CoreError::ParentNotFound`] when `parent_id` does not name
    /// a comment of the same thread; nothing is written in that case.
    #[tracing::instrument(skip(self, new), fields(thread = %new.thread_path, parent = ?new.parent_id))]
    pub fn create_comment(&self, new: &NewComment, created_at: i64) -> CoreResult<CommentId> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .storage("failed to begin transaction")?;

        let depth_level = match new.parent_id {
            None => 0,
            Some(parent_id) => {
                let parent_depth: Option<i64> = tx
                    .query_row(
                        "SELECT c.depth_level FROM comment c
                         JOIN thread t ON t.thread_id = c.thread_id
                         WHERE c.comment_id = ?1 AND t.path = ?2",
                        params![parent_id, new.thread_path],
                        |row| row.get(0),
                    )
                    .optional()
                    .storage("failed to look up parent comment")?;

                let Some(parent_depth) = parent_depth else {
                    return Err(CoreError::ParentNotFound {
                        parent_id,
                        thread_path: new.thread_path.clone(),
                    });
                };
                parent_depth + 1
            }
        };

        let root_increment = i64::from(new.parent_id.is_none());
        let thread_id: i64 = tx
            .query_row(
                "INSERT INTO thread (path, num_total, num_root) VALUES (?1, 1, ?2)
                 ON CONFLICT(path) DO UPDATE SET
                     num_total = num_total + 1,
                     num_root = num_root + excluded.num_root
                 RETURNING thread_id",
                params![new.thread_path, root_increment],
                |row| row.get(0),
            )
            .storage("failed to upsert thread")?;

        let email = (!new.email.is_empty()).then_some(new.email.as_str());
        tx.execute(
            "INSERT INTO comment
                 (thread_id, parent_id, depth_level, created_at, touched_at, author, email, text)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7)",
            params![
                thread_id,
                new.parent_id,
                depth_level,
                created_at,
                new.author,
                email,
                new.text
            ],
        )
        .storage("failed to insert comment")?;
        let comment_id = tx.last_insert_rowid();

        if let Some(parent_id) = new.parent_id {
            // touched_at never moves backwards, even for back-dated inserts.
            tx.execute(
                "WITH RECURSIVE ancestors(id) AS (
                     SELECT ?1
                     UNION ALL
                     SELECT c.parent_id FROM comment c
                     JOIN ancestors a ON c.comment_id = a.id
                     WHERE c.parent_id IS NOT NULL
                 )
                 UPDATE comment SET touched_at = MAX(touched_at, ?2)
                 WHERE comment_id IN (SELECT id FROM ancestors)",
                params![parent_id, created_at],
            )
            .storage("failed to update touched_at of ancestors")?;

            tx.execute(
                "UPDATE comment SET num_children = num_children + 1 WHERE comment_id = ?1",
                params![parent_id],
            )
            .storage("failed to increment num_children of parent")?;
        }

        tx.commit().storage("failed to commit comment")?;

        tracing::info!(comment_id, thread_id, depth_level, "created comment");
        Ok(comment_id)
    }
}
