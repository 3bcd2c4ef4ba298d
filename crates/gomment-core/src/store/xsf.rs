//! Newest / Oldest Sibling First ordering.
//!
//! Level-synchronized sampling: the result budget is split into per-level
//! quotas ([`QuotaPolicy::tiers`]) and each level is drawn only from the
//! children of the comments selected on the level above. The whole selection
//! is a single statement of chained CTEs. Negative depths and counts are
//! rejected before any query runs.

use rusqlite::params_from_iter;

use super::{CommentStore, COMMENT_SELECT_FIELDS};
use crate::config::QuotaPolicy;
use crate::errors::{non_negative, CoreResult};
use crate::model::{Comment, SortDirection, ThreadMetaInfo};

impl CommentStore {
    /// Newest sibling first: every level ordered by `created_at DESC`.
    pub fn get_comments_nsf(
        &self,
        thread_path: &str,
        max_depth: i64,
        max_count: i64,
        quotas: &QuotaPolicy,
    ) -> CoreResult<(Vec<Comment>, ThreadMetaInfo)> {
        self.get_comments_xsf(thread_path, max_depth, max_count, quotas, SortDirection::Desc)
    }

    /// Oldest sibling first: every level ordered by `created_at ASC`.
    pub fn get_comments_osf(
        &self,
        thread_path: &str,
        max_depth: i64,
        max_count: i64,
        quotas: &QuotaPolicy,
    ) -> CoreResult<(Vec<Comment>, ThreadMetaInfo)> {
        self.get_comments_xsf(thread_path, max_depth, max_count, quotas, SortDirection::Asc)
    }

    #[tracing::instrument(skip(self, quotas))]
    fn get_comments_xsf(
        &self,
        thread_path: &str,
        max_depth: i64,
        max_count: i64,
        quotas: &QuotaPolicy,
        direction: SortDirection,
    ) -> CoreResult<(Vec<Comment>, ThreadMetaInfo)> {
        non_negative("max_depth", max_depth)?;
        non_negative("max_count", max_count)?;

        let meta = self.get_thread_meta_info(thread_path)?;
        if !meta.exists() {
            return Ok((Vec::new(), meta));
        }

        let tiers = quotas.tiers(max_count, max_depth);
        let sql = tiered_query(tiers.len(), direction);

        let mut params = Vec::with_capacity(tiers.len() + 1);
        params.push(meta.thread_id);
        params.extend(tiers.iter().copied());

        let comments = self.query_comments(&sql, params_from_iter(params))?;
        tracing::debug!(?tiers, count = comments.len(), "loaded sibling-first comments");
        Ok((comments, meta))
    }
}

/// Build the sampling statement for `levels` tiers.
///
/// Parameter `?1` is the thread id, `?2..` the per-level quotas, root first.
fn tiered_query(levels: usize, direction: SortDirection) -> String {
    let dir = direction.as_sql();

    let mut ctes = vec![format!(
        "lvl0 AS (
             SELECT comment_id FROM comment
             WHERE thread_id = ?1 AND parent_id IS NULL
             ORDER BY created_at {dir}, comment_id {dir}
             LIMIT ?2
         )"
    )];
    for level in 1..levels {
        let above = level - 1;
        let quota_param = level + 2;
        ctes.push(format!(
            "lvl{level} AS (
                 SELECT c.comment_id FROM comment c
                 JOIN lvl{above} p ON c.parent_id = p.comment_id
                 ORDER BY c.created_at {dir}, c.comment_id {dir}
                 LIMIT ?{quota_param}
             )"
        ));
    }

    let selected = (0..levels)
        .map(|level| format!("SELECT comment_id FROM lvl{level}"))
        .collect::<Vec<_>>()
        .join(" UNION ALL ");

    format!(
        "WITH {ctes}
         SELECT {COMMENT_SELECT_FIELDS} FROM comment
         WHERE comment_id IN ({selected})
         ORDER BY created_at {dir}, comment_id {dir}",
        ctes = ctes.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ids, reply, root, store};
    use super::*;
    use crate::model::{CommentId, NewComment};

    /// Five roots at t=1..5, each with two replies. Returns (roots, replies per root).
    fn forest(store: &CommentStore, path: &str) -> (Vec<CommentId>, Vec<[CommentId; 2]>) {
        let roots: Vec<_> = (1..=5).map(|t| root(store, path, t)).collect();
        let replies = roots
            .iter()
            .zip(0..)
            .map(|(&r, i)| {
                [
                    reply(store, path, r, 10 + 2 * i),
                    reply(store, path, r, 11 + 2 * i),
                ]
            })
            .collect();
        (roots, replies)
    }

    #[test]
    fn test_tiered_query_shape() {
        let sql = tiered_query(3, SortDirection::Asc);
        assert!(sql.contains("JOIN lvl0 p"));
        assert!(sql.contains("JOIN lvl1 p"));
        assert!(sql.contains("LIMIT ?4"));
        assert!(!sql.contains("lvl3"));

        let sql = tiered_query(1, SortDirection::Desc);
        assert!(!sql.contains("lvl1"));
        assert!(sql.contains("created_at DESC"));
    }

    #[test]
    fn test_xsf_unknown_thread_is_empty() {
        let store = store();
        let quotas = QuotaPolicy::default();
        let (comments, meta) = store.get_comments_nsf("/none", 2, 10, &quotas).unwrap();
        assert!(comments.is_empty());
        assert_eq!(meta.thread_id, 0);
    }

    #[test]
    fn test_xsf_rejects_negative_arguments() {
        let store = store();
        forest(&store, "/neg");
        let quotas = QuotaPolicy::default();

        let err = store.get_comments_osf("/neg", 0, -1, &quotas).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = store.get_comments_nsf("/neg", 1, -1, &quotas).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = store.get_comments_nsf("/neg", -1, 4, &quotas).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_depth_zero_returns_roots_only() {
        let store = store();
        let (roots, _) = forest(&store, "/roots");
        let quotas = QuotaPolicy::default();

        let (nsf, _) = store.get_comments_nsf("/roots", 0, 10, &quotas).unwrap();
        assert_eq!(ids(&nsf), roots.iter().rev().copied().collect::<Vec<_>>());

        let (osf, _) = store.get_comments_osf("/roots", 0, 3, &quotas).unwrap();
        assert_eq!(ids(&osf), roots[..3].to_vec());
    }

    #[test]
    fn test_nsf_depth_one_quota() {
        let store = store();
        let (roots, replies) = forest(&store, "/nsf");
        let quotas = QuotaPolicy::default();

        let (comments, meta) = store.get_comments_nsf("/nsf", 1, 4, &quotas).unwrap();
        // Three newest roots plus the newest reply among their children.
        assert_eq!(
            ids(&comments),
            vec![replies[4][1], roots[4], roots[3], roots[2]]
        );
        assert_eq!(meta.num_total, 15);
        assert_eq!(meta.num_root, 5);
    }

    #[test]
    fn test_osf_depth_one_quota() {
        let store = store();
        let (roots, replies) = forest(&store, "/osf");
        let quotas = QuotaPolicy::default();

        let (comments, _) = store.get_comments_osf("/osf", 1, 4, &quotas).unwrap();
        assert_eq!(
            ids(&comments),
            vec![roots[0], roots[1], roots[2], replies[0][0]]
        );
    }

    #[test]
    fn test_single_root_depth_one_keeps_one_reply() {
        let store = store();
        let r = root(&store, "/one", 1);
        let replies: Vec<_> = (2..=4).map(|t| reply(&store, "/one", r, t)).collect();
        let quotas = QuotaPolicy::default();

        // tiers [3, 1]: the root plus exactly one of its three replies.
        let (nsf, _) = store.get_comments_nsf("/one", 1, 4, &quotas).unwrap();
        assert_eq!(ids(&nsf), vec![replies[2], r]);

        let (osf, _) = store.get_comments_osf("/one", 1, 4, &quotas).unwrap();
        assert_eq!(ids(&osf), vec![r, replies[0]]);
    }

    #[test]
    fn test_nsf_keeps_comment_fields() {
        let store = store();
        let r = store
            .create_comment(&NewComment::root("/fields", "ana", "", "first!"), 1)
            .unwrap();
        let answer = store
            .create_comment(
                &NewComment::reply("/fields", r, "ben", "ben@example.com", "welcome, ana"),
                2,
            )
            .unwrap();
        let quotas = QuotaPolicy::default();

        let (comments, _) = store.get_comments_nsf("/fields", 1, 10, &quotas).unwrap();
        assert_eq!(ids(&comments), vec![answer, r]);

        let second = &comments[0];
        assert_eq!(second.parent_id, Some(r));
        assert_eq!(second.author, "ben");
        assert_eq!(second.text, "welcome, ana");
        assert_eq!(second.created_at, 2);
        assert_eq!(second.num_children, 0);

        let first = &comments[1];
        assert_eq!(first.parent_id, None);
        assert_eq!(first.author, "ana");
        assert_eq!(first.text, "first!");
        assert_eq!(first.touched_at, 2);
        assert_eq!(first.num_children, 1);
    }

    #[test]
    fn test_children_only_drawn_from_selected_roots() {
        let store = store();
        let (roots, _) = forest(&store, "/scope");
        let quotas = QuotaPolicy::default();

        let (comments, _) = store.get_comments_nsf("/scope", 1, 8, &quotas).unwrap();
        let selected_roots: Vec<_> = comments
            .iter()
            .filter(|c| c.parent_id.is_none())
            .map(|c| c.id)
            .collect();
        assert_eq!(selected_roots.len(), 6.min(roots.len()));
        for c in comments.iter().filter(|c| c.parent_id.is_some()) {
            assert!(selected_roots.contains(&c.parent_id.unwrap()));
        }
    }

    #[test]
    fn test_chain_depth_limits_levels() {
        let store = store();
        let r = root(&store, "/chain", 1);
        let c1 = reply(&store, "/chain", r, 2);
        let c2 = reply(&store, "/chain", c1, 3);
        reply(&store, "/chain", c2, 4);
        let quotas = QuotaPolicy::default();

        for depth in 0..6 {
            let (comments, _) = store.get_comments_osf("/chain", depth, 10, &quotas).unwrap();
            let expected = usize::try_from(depth + 1).unwrap().min(3);
            assert_eq!(comments.len(), expected, "depth {depth}");
        }
    }

    #[test]
    fn test_deep_tiers_respect_quota_and_order() {
        let store = store();
        let r = root(&store, "/deep", 1);
        let mut t = 2;
        for _ in 0..4 {
            let child = reply(&store, "/deep", r, t);
            t += 1;
            for _ in 0..3 {
                reply(&store, "/deep", child, t);
                t += 1;
            }
        }
        let quotas = QuotaPolicy::default();

        let (comments, _) = store.get_comments_nsf("/deep", 3, 10, &quotas).unwrap();
        // tiers [7, 2, 1]: one root, two children, one grandchild.
        assert_eq!(comments.len(), 4);
        assert!(comments
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));

        let grandchildren = comments
            .iter()
            .filter(|c| c.parent_id.is_some() && c.parent_id != Some(r))
            .count();
        assert_eq!(grandchildren, 1);
    }

    #[test]
    fn test_custom_quota_policy() {
        let store = store();
        let (roots, replies) = forest(&store, "/custom");
        let quotas = QuotaPolicy {
            shallow_child_percent: 50,
            ..QuotaPolicy::default()
        };

        let (comments, _) = store.get_comments_osf("/custom", 1, 4, &quotas).unwrap();
        assert_eq!(
            ids(&comments),
            vec![roots[0], roots[1], replies[0][0], replies[0][1]]
        );
    }
}
