//! Assembly of flat query results into comment trees.

use std::collections::HashMap;

use crate::model::{Comment, CommentId, CommentTree};

/// Trees assembled from one query result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub trees: Vec<CommentTree>,
    /// Top-level trees.
    pub num_roots: usize,
    /// Nodes across all trees.
    pub num_nodes: usize,
}

/// Build the trees hanging below `root_parent` (`None` or `Some(0)` for the
/// thread's root comments).
///
/// Siblings keep the relative order they have in `comments`. Children are only
/// attached while `depth_left > 0`, each level consuming one unit. Comments
/// whose parent is not part of the assembled trees are dropped.
#[must_use]
pub fn build_tree(comments: &[Comment], root_parent: Option<CommentId>, depth_left: i64) -> Forest {
    let mut by_parent: HashMap<Option<CommentId>, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        by_parent.entry(comment.parent_id).or_default().push(comment);
    }

    let mut num_nodes = 0;
    let trees = assemble(
        &by_parent,
        root_parent.filter(|id| *id != 0),
        depth_left,
        &mut num_nodes,
    );

    Forest {
        num_roots: trees.len(),
        num_nodes,
        trees,
    }
}

fn assemble(
    by_parent: &HashMap<Option<CommentId>, Vec<&Comment>>,
    parent: Option<CommentId>,
    depth_left: i64,
    num_nodes: &mut usize,
) -> Vec<CommentTree> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };

    siblings
        .iter()
        .map(|comment| {
            *num_nodes += 1;
            let children = if depth_left > 0 {
                assemble(by_parent, Some(comment.id), depth_left - 1, num_nodes)
            } else {
                Vec::new()
            };
            CommentTree {
                comment: (*comment).clone(),
                children,
            }
        })
        .collect()
}
