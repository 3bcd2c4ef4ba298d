//! gomment-core: storage and retrieval engine for threaded page comments.
//!
//! This crate owns the SQLite schema and its migrations, transactional comment
//! creation, the three ordering strategies (NBF, NSF, OSF), tree assembly,
//! incremental "load more" paging and the service facade that applies the
//! configured limits on top of all of it.

pub mod config;
pub mod core;
pub mod errors;
pub mod model;
pub mod store;
pub mod tree;

pub use config::{EngineConfig, Limits, QuotaPolicy};
pub use errors::{CoreError, CoreResult};
pub use model::{
    Comment, CommentId, CommentResult, CommentRow, CommentTree, NewComment, SortDirection,
    SortPolicy, Thread, ThreadId, ThreadMetaInfo,
};
pub use store::CommentStore;
