//! Newest Branch First ordering.

use rusqlite::params;

use super::{CommentStore, COMMENT_SELECT_FIELDS};
use crate::errors::{non_negative, CoreResult};
use crate::model::{Comment, ThreadMetaInfo};

impl CommentStore {
    /// Comments of the thread ordered by most recent activity in their branch.
    ///
    /// Selects rows with `depth_level < max_depth`, ordered by
    /// `touched_at DESC, created_at ASC`, at most `max_count` of them. Ancestor
    /// propagation of `touched_at` makes active branches float upward while
    /// parents still precede their replies.
    ///
    /// Negative `max_depth` or `max_count` fail with
    /// [`CoreError::InvalidArgument`](crate::errors::CoreError::InvalidArgument).
    #[tracing::instrument(skip(self))]
    pub fn get_comments_nbf(
        &self,
        thread_path: &str,
        max_depth: i64,
        max_count: i64,
    ) -> CoreResult<(Vec<Comment>, ThreadMetaInfo)> {
        non_negative("max_depth", max_depth)?;
        non_negative("max_count", max_count)?;

        let meta = self.get_thread_meta_info(thread_path)?;
        if !meta.exists() {
            return Ok((Vec::new(), meta));
        }

        let sql = format!(
            "SELECT {COMMENT_SELECT_FIELDS} FROM comment
             WHERE thread_id = ?1 AND depth_level < ?2
             ORDER BY touched_at DESC, created_at ASC
             LIMIT ?3"
        );
        let comments = self.query_comments(&sql, params![meta.thread_id, max_depth, max_count])?;

        tracing::debug!(count = comments.len(), "loaded NBF comments");
        Ok((comments, meta))
    }
}
