//! Comment service: create, tree queries and "load more" paging.

use crate::config::EngineConfig;
use crate::errors::{non_negative, CoreError, CoreResult};
use crate::model::{Comment, CommentId, CommentResult, NewComment, SortPolicy, ThreadId};
use crate::store::CommentStore;
use crate::tree::build_tree;

use super::clamp_to;

/// Service for comment operations.
pub struct CommentService<'a> {
    config: &'a EngineConfig,
    store: &'a CommentStore,
}

impl<'a> CommentService<'a> {
    pub(crate) const fn new(config: &'a EngineConfig, store: &'a CommentStore) -> Self {
        Self { config, store }
    }

    /// Create a comment stamped with `created_at` (unix seconds).
    ///
    /// Replies deeper than `limits.comment_depth_max` are rejected with
    /// [`CoreError::InvalidArgument`]; a parent that is unknown or belongs to
    /// another thread yields [`CoreError::ParentNotFound`].
    pub fn create(&self, new: &NewComment, created_at: i64) -> CoreResult<CommentId> {
        if let Some(parent_id) = new.parent_id {
            let depth_max = self.config.limits.comment_depth_max;
            // A missing or foreign parent is reported by the store as not found.
            if let Some(parent) = self.store.get_comment_row(parent_id)? {
                let thread = self.store.get_thread_meta_info(&new.thread_path)?;
                if parent.thread_id == thread.thread_id && parent.depth_level + 1 > depth_max {
                    return Err(CoreError::InvalidArgument(format!(
                        "reply to comment {parent_id} would exceed the maximum comment depth of {depth_max}"
                    )));
                }
            }
        }
        self.store.create_comment(new, created_at)
    }

    /// Tree of the thread at `thread_path` below `parent_id` (roots when
    /// `None`), ordered by `policy`.
    ///
    /// `max_depth` is clamped to `limits.initial_query_depth_max` and
    /// `max_count` to `limits.query_limit_max`.
    #[tracing::instrument(skip(self))]
    pub fn get_comments(
        &self,
        policy: SortPolicy,
        thread_path: &str,
        parent_id: Option<CommentId>,
        max_depth: i64,
        max_count: i64,
    ) -> CoreResult<CommentResult> {
        let limits = &self.config.limits;
        let max_depth = clamp_to(
            "max_depth",
            non_negative("max_depth", max_depth)?,
            limits.initial_query_depth_max,
        );
        let max_count = clamp_to(
            "max_count",
            non_negative("max_count", max_count)?,
            limits.query_limit_max,
        );

        let quotas = &self.config.quotas;
        let (comments, meta) = match policy {
            SortPolicy::Nbf => self.store.get_comments_nbf(thread_path, max_depth, max_count)?,
            SortPolicy::Nsf => {
                self.store
                    .get_comments_nsf(thread_path, max_depth, max_count, quotas)?
            }
            SortPolicy::Osf => {
                self.store
                    .get_comments_osf(thread_path, max_depth, max_count, quotas)?
            }
        };

        let forest = build_tree(&comments, parent_id, max_depth);
        Ok(CommentResult {
            comments: forest.trees,
            num_root: meta.num_root,
            num_total: meta.num_total,
            num_root_payload: forest.num_roots,
            num_payload: forest.num_nodes,
            thread_id: meta.thread_id,
        })
    }

    pub fn get_comments_nbf(
        &self,
        thread_path: &str,
        parent_id: Option<CommentId>,
        max_depth: i64,
        max_count: i64,
    ) -> CoreResult<CommentResult> {
        self.get_comments(SortPolicy::Nbf, thread_path, parent_id, max_depth, max_count)
    }

    pub fn get_comments_nsf(
        &self,
        thread_path: &str,
        parent_id: Option<CommentId>,
        max_depth: i64,
        max_count: i64,
    ) -> CoreResult<CommentResult> {
        self.get_comments(SortPolicy::Nsf, thread_path, parent_id, max_depth, max_count)
    }

    pub fn get_comments_osf(
        &self,
        thread_path: &str,
        parent_id: Option<CommentId>,
        max_depth: i64,
        max_count: i64,
    ) -> CoreResult<CommentResult> {
        self.get_comments(SortPolicy::Osf, thread_path, parent_id, max_depth, max_count)
    }

    /// Next page of siblings, see [`CommentStore::get_more_comments`].
    ///
    /// `limit` is clamped to `limits.query_limit_max`.
    pub fn get_more(
        &self,
        policy: SortPolicy,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        newest_created_at: i64,
        exclude_ids: &[CommentId],
        limit: i64,
    ) -> CoreResult<Vec<Comment>> {
        let limit = clamp_to(
            "limit",
            non_negative("limit", limit)?,
            self.config.limits.query_limit_max,
        );
        self.store.get_more_comments(
            thread_id,
            parent_id,
            newest_created_at,
            exclude_ids,
            limit,
            policy,
        )
    }

    pub fn get_more_comments_nbf(
        &self,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        newest_created_at: i64,
        exclude_ids: &[CommentId],
        limit: i64,
    ) -> CoreResult<Vec<Comment>> {
        self.get_more(SortPolicy::Nbf, thread_id, parent_id, newest_created_at, exclude_ids, limit)
    }

    pub fn get_more_comments_nsf(
        &self,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        newest_created_at: i64,
        exclude_ids: &[CommentId],
        limit: i64,
    ) -> CoreResult<Vec<Comment>> {
        self.get_more(SortPolicy::Nsf, thread_id, parent_id, newest_created_at, exclude_ids, limit)
    }

    pub fn get_more_comments_osf(
        &self,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        newest_created_at: i64,
        exclude_ids: &[CommentId],
        limit: i64,
    ) -> CoreResult<Vec<Comment>> {
        self.get_more(SortPolicy::Osf, thread_id, parent_id, newest_created_at, exclude_ids, limit)
    }
}
