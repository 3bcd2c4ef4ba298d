//! Incremental "load more" paging.

use rusqlite::params;

use super::{CommentStore, COMMENT_SELECT_FIELDS};
use crate::errors::{CoreError, CoreResult};
use crate::model::{Comment, CommentId, SortDirection, SortPolicy, ThreadId};

impl CommentStore {
    /// Next page of siblings below `parent_id` (roots when `None` or `Some(0)`).
    ///
    /// Only comments created at or before `newest_created_at` qualify. Ids in
    /// `exclude_ids` (already shown to the reader) are skipped; the list must be
    /// strictly ascending. Returns at most `limit` comments, fewer when the
    /// siblings are exhausted.
    #[tracing::instrument(skip(self, exclude_ids), fields(excluded = exclude_ids.len()))]
    pub fn get_more_comments(
        &self,
        thread_id: ThreadId,
        parent_id: Option<CommentId>,
        newest_created_at: i64,
        exclude_ids: &[CommentId],
        limit: i64,
        policy: SortPolicy,
    ) -> CoreResult<Vec<Comment>> {
        check_strictly_ascending(exclude_ids)?;
        let page_size = usize::try_from(limit)
            .map_err(|_| CoreError::InvalidArgument(format!("limit must be >= 0, was {limit}")))?;
        let excluded = i64::try_from(exclude_ids.len()).map_err(|_| {
            CoreError::InvalidArgument("too many excluded comment ids".to_string())
        })?;

        let parent_id = parent_id.filter(|id| *id != 0);
        let direction = policy.direction();
        let dir = direction.as_sql();
        let sql = format!(
            "SELECT {COMMENT_SELECT_FIELDS} FROM comment
             WHERE thread_id = ?1 AND parent_id IS ?2 AND created_at <= ?3
             ORDER BY created_at {dir}, comment_id {dir}
             LIMIT ?4"
        );
        let rows = self.query_comments(
            &sql,
            params![
                thread_id,
                parent_id,
                newest_created_at,
                limit.saturating_add(excluded)
            ],
        )?;

        let page = skip_excluded(rows, exclude_ids, direction, page_size);
        tracing::debug!(count = page.len(), "loaded more comments");
        Ok(page)
    }
}

fn check_strictly_ascending(ids: &[CommentId]) -> CoreResult<()> {
    if let Some(pair) = ids.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(CoreError::InvalidArgument(format!(
            "excluded comment ids must be strictly ascending, found {} before {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Merge `rows` against the sorted exclusion list in one pass.
///
/// Descending rows consume the list from its end, ascending rows from its
/// start. Stops once `limit` rows are kept.
fn skip_excluded(
    rows: Vec<Comment>,
    exclude_ids: &[CommentId],
    direction: SortDirection,
    limit: usize,
) -> Vec<Comment> {
    let mut kept = Vec::with_capacity(limit.min(rows.len()));
    let mut cursor = match direction {
        SortDirection::Desc => exclude_ids.len(),
        SortDirection::Asc => 0,
    };

    for comment in rows {
        if kept.len() == limit {
            break;
        }

        let excluded = match direction {
            SortDirection::Desc => {
                while cursor > 0 && exclude_ids[cursor - 1] > comment.id {
                    cursor -= 1;
                }
                cursor > 0 && exclude_ids[cursor - 1] == comment.id
            }
            SortDirection::Asc => {
                while cursor < exclude_ids.len() && exclude_ids[cursor] < comment.id {
                    cursor += 1;
                }
                cursor < exclude_ids.len() && exclude_ids[cursor] == comment.id
            }
        };
        if !excluded {
            kept.push(comment);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ids, reply, root, store};
    use super::*;

    fn comment(id: CommentId) -> Comment {
        Comment {
            id,
            parent_id: None,
            author: String::new(),
            text: String::new(),
            created_at: id,
            touched_at: id,
            num_children: 0,
        }
    }

    fn thread_id(store: &CommentStore, path: &str) -> ThreadId {
        store.get_thread_meta_info(path).unwrap().thread_id
    }

    #[test]
    fn test_skip_excluded_descending() {
        let rows = [9, 7, 5, 4, 2].map(comment).to_vec();
        let kept = skip_excluded(rows, &[1, 4, 7, 8], SortDirection::Desc, 10);
        assert_eq!(ids(&kept), vec![9, 5, 2]);
    }

    #[test]
    fn test_skip_excluded_ascending() {
        let rows = [2, 4, 5, 7, 9].map(comment).to_vec();
        let kept = skip_excluded(rows, &[1, 4, 7, 8], SortDirection::Asc, 10);
        assert_eq!(ids(&kept), vec![2, 5, 9]);
    }

    #[test]
    fn test_skip_excluded_truncates_to_limit() {
        let rows = [5, 4, 3, 2, 1].map(comment).to_vec();
        let kept = skip_excluded(rows, &[4], SortDirection::Desc, 2);
        assert_eq!(ids(&kept), vec![5, 3]);
    }

    #[test]
    fn test_unsorted_exclusion_rejected() {
        let store = store();
        root(&store, "/more", 1);
        let thread = thread_id(&store, "/more");

        let err = store
            .get_more_comments(thread, None, 10, &[5, 3], 10, SortPolicy::Nbf)
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = store
            .get_more_comments(thread, None, 10, &[3, 3], 10, SortPolicy::Osf)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_negative_limit_rejected() {
        let store = store();
        let err = store
            .get_more_comments(1, None, 10, &[], -1, SortPolicy::Nsf)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_more_roots_skips_shown_comment() {
        let store = store();
        let first = root(&store, "/page", 1);
        let second = root(&store, "/page", 2);
        let thread = thread_id(&store, "/page");

        let page = store
            .get_more_comments(thread, Some(0), 2, &[second], 1, SortPolicy::Nbf)
            .unwrap();
        assert_eq!(ids(&page), vec![first]);
    }

    #[test]
    fn test_more_respects_watermark_and_parent() {
        let store = store();
        let r = root(&store, "/scope", 1);
        let a = reply(&store, "/scope", r, 2);
        let b = reply(&store, "/scope", r, 3);
        let late = reply(&store, "/scope", r, 9);
        root(&store, "/scope", 4);
        reply(&store, "/scope", a, 5);
        let thread = thread_id(&store, "/scope");

        let page = store
            .get_more_comments(thread, Some(r), 8, &[], 10, SortPolicy::Nsf)
            .unwrap();
        assert_eq!(ids(&page), vec![b, a]);

        let page = store
            .get_more_comments(thread, Some(r), 9, &[], 10, SortPolicy::Osf)
            .unwrap();
        assert_eq!(ids(&page), vec![a, b, late]);
    }

    #[test]
    fn test_more_oldest_first_with_exclusions() {
        let store = store();
        let roots: Vec<_> = (1..=6).map(|t| root(&store, "/osf", t)).collect();
        let thread = thread_id(&store, "/osf");

        let page = store
            .get_more_comments(thread, None, 6, &[roots[0], roots[2]], 3, SortPolicy::Osf)
            .unwrap();
        assert_eq!(ids(&page), vec![roots[1], roots[3], roots[4]]);
    }

    #[test]
    fn test_more_returns_fewer_when_exhausted() {
        let store = store();
        let a = root(&store, "/short", 1);
        let b = root(&store, "/short", 2);
        let thread = thread_id(&store, "/short");

        let page = store
            .get_more_comments(thread, None, 100, &[b], 10, SortPolicy::Nsf)
            .unwrap();
        assert_eq!(ids(&page), vec![a]);

        let page = store
            .get_more_comments(thread, None, 0, &[], 10, SortPolicy::Nsf)
            .unwrap();
        assert!(page.is_empty());
    }
}
