//! Thread service: listing and counters.

use crate::errors::CoreResult;
use crate::model::{Thread, ThreadMetaInfo};
use crate::store::CommentStore;

/// Service for thread operations.
pub struct ThreadService<'a> {
    store: &'a CommentStore,
}

impl<'a> ThreadService<'a> {
    pub(crate) const fn new(store: &'a CommentStore) -> Self {
        Self { store }
    }

    /// All threads in creation order.
    pub fn list(&self) -> CoreResult<Vec<Thread>> {
        self.store.get_threads()
    }

    /// Counters of the thread at `path`; zero when nothing was posted yet.
    pub fn meta(&self, path: &str) -> CoreResult<ThreadMetaInfo> {
        self.store.get_thread_meta_info(path)
    }
}
