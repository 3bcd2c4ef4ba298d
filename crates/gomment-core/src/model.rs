//! Domain types shared by the store, the tree assembler and the service layer.
//!
//! All result types implement `Serialize`; field names follow the JSON shape
//! the comment widget consumes (`comment_id`, `num_root_payload`, ...).

use serde::Serialize;

/// Row id of a comment.
pub type CommentId = i64;

/// Row id of a thread. `0` means "thread does not exist yet".
pub type ThreadId = i64;

/// A comment as returned to readers. The author's email is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "comment_id")]
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub text: String,
    pub created_at: i64,
    pub touched_at: i64,
    pub num_children: i64,
}

/// Every stored column of a comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRow {
    pub comment_id: CommentId,
    pub thread_id: ThreadId,
    pub parent_id: Option<CommentId>,
    pub num_children: i64,
    pub depth_level: i64,
    pub verified: bool,
    pub created_at: i64,
    pub edited_at: Option<i64>,
    pub touched_at: i64,
    pub author: String,
    pub email: Option<String>,
    pub text: String,
}

/// Input for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub thread_path: String,
    /// `None` creates a root comment.
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub email: String,
    pub text: String,
}

impl NewComment {
    /// A root comment on `thread_path`.
    #[must_use]
    pub fn root(thread_path: &str, author: &str, email: &str, text: &str) -> Self {
        Self {
            thread_path: thread_path.to_string(),
            parent_id: None,
            author: author.to_string(),
            email: email.to_string(),
            text: text.to_string(),
        }
    }

    /// A reply to `parent_id` on `thread_path`.
    #[must_use]
    pub fn reply(
        thread_path: &str,
        parent_id: CommentId,
        author: &str,
        email: &str,
        text: &str,
    ) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(thread_path, author, email, text)
        }
    }
}

/// Aggregate counters of a thread. All zero when the thread does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThreadMetaInfo {
    pub thread_id: ThreadId,
    pub num_total: i64,
    pub num_root: i64,
}

impl ThreadMetaInfo {
    /// Whether any comment was ever posted to the thread.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.thread_id != 0
    }
}

/// A thread as listed for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    #[serde(rename = "thread_id")]
    pub id: ThreadId,
    pub path: String,
    pub num_total: i64,
    pub num_root: i64,
}

/// A comment and its (depth-bounded) replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentTree {
    pub comment: Comment,
    pub children: Vec<CommentTree>,
}

/// Response of a tree query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentResult {
    pub comments: Vec<CommentTree>,
    /// Root comments in the whole thread.
    pub num_root: i64,
    /// Comments in the whole thread.
    pub num_total: i64,
    /// Top-level trees in this payload.
    pub num_root_payload: usize,
    /// Nodes in this payload.
    pub num_payload: usize,
    pub thread_id: ThreadId,
}

/// Ordering policy of a comment query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SortPolicy {
    /// Newest branch first: branches with the most recent activity on top.
    #[default]
    Nbf,
    /// Newest sibling first.
    Nsf,
    /// Oldest sibling first.
    Osf,
}

impl SortPolicy {
    /// Direction of `created_at` ordering among siblings.
    #[must_use]
    pub const fn direction(self) -> SortDirection {
        match self {
            Self::Nbf | Self::Nsf => SortDirection::Desc,
            Self::Osf => SortDirection::Asc,
        }
    }
}

/// SQL sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for `ORDER BY`.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
