//! Service layer for gomment-core.
//!
//! Provides typed, high-level APIs for comment and thread operations. The
//! service layer applies the configured limits on top of the raw
//! [`CommentStore`] and assembles query results into trees.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use gomment_core::core::CoreContext;
//! use gomment_core::{EngineConfig, NewComment};
//!
//! let ctx = CoreContext::new(Path::new("/var/lib/gomment/gomment.db"), EngineConfig::default()).unwrap();
//! let services = ctx.services().unwrap();
//!
//! let id = services
//!     .comments()
//!     .create(&NewComment::root("/blog/first", "ana", "ana@example.com", "Nice post"), 1_700_000_000)
//!     .unwrap();
//! let result = services.comments().get_comments_nbf("/blog/first", None, 3, 50).unwrap();
//! assert_eq!(result.comments[0].comment.id, id);
//! ```

pub mod comments;
pub mod threads;

use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::errors::CoreResult;
use crate::store::CommentStore;

/// Context for gomment services.
///
/// Holds the database location and the validated engine configuration.
/// Create one per process and open services per worker.
#[derive(Debug, Clone)]
pub struct CoreContext {
    db_path: PathBuf,
    config: EngineConfig,
}

impl CoreContext {
    /// Create a new core context.
    ///
    /// Fails with [`CoreError::Config`](crate::errors::CoreError::Config) if the configuration is inconsistent.
    pub fn new(db_path: &Path, config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
            config,
        })
    }

    /// Path to the comment database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open the store (migrating it if needed) and wrap it in a service facade.
    pub fn services(&self) -> CoreResult<GommentServices> {
        let store = CommentStore::open(&self.db_path)?;
        Ok(GommentServices {
            config: self.config.clone(),
            store,
        })
    }
}

/// Facade providing all gomment service APIs.
///
/// Owns one store handle. Workers that run concurrently each create their own
/// facade through [`CoreContext::services`].
#[derive(Debug)]
pub struct GommentServices {
    config: EngineConfig,
    store: CommentStore,
}

impl GommentServices {
    /// Build a facade around an already opened store.
    pub fn with_store(store: CommentStore, config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    /// Access comment operations.
    #[must_use]
    pub fn comments(&self) -> comments::CommentService<'_> {
        comments::CommentService::new(&self.config, &self.store)
    }

    /// Access thread operations.
    #[must_use]
    pub fn threads(&self) -> threads::ThreadService<'_> {
        threads::ThreadService::new(&self.store)
    }

    /// Get a reference to the underlying store.
    ///
    /// Useful for queries not covered by the service layer.
    #[must_use]
    pub const fn store(&self) -> &CommentStore {
        &self.store
    }

}

/// Clamp a request parameter to its configured maximum.
pub(crate) fn clamp_to(name: &str, value: i64, max: i64) -> i64 {
    if value > max {
        tracing::warn!(name, requested = value, max, "request parameter clamped");
        max
    } else {
        value
    }
}
