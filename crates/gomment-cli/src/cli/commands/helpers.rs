//! Shared helpers for CLI commands.

use anyhow::{Context, Result};
use std::path::Path;

use gomment_core::core::{CoreContext, GommentServices};
use gomment_core::{CoreError, EngineConfig};

/// Build the service context from the global `--db` and `--config` flags.
pub fn load_context(db_path: &Path, config_path: Option<&Path>) -> Result<CoreContext> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(CoreContext::new(db_path, config)?)
}

/// Open the database (migrating it if needed) behind the service facade.
pub fn open_services(ctx: &CoreContext) -> Result<GommentServices> {
    ctx.services().with_context(|| {
        format!(
            "Failed to open comment database {}",
            ctx.db_path().display()
        )
    })
}

/// Turn engine errors into messages with a hint on how to recover.
pub fn explain(err: CoreError, thread: &str) -> anyhow::Error {
    match err {
        CoreError::ParentNotFound { .. } => anyhow::anyhow!(
            "{err}\n  To fix: gomment show --thread {thread} --format pretty"
        ),
        CoreError::InvalidArgument(_) => anyhow::anyhow!("{err}\n  See: gomment --help"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_context_without_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let ctx = load_context(&dir.path().join("c.db"), None).unwrap();
        assert_eq!(ctx.config(), &EngineConfig::default());
    }

    #[test]
    fn test_load_context_reads_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("gomment.json");
        std::fs::write(&config_path, r#"{"limits": {"query_limit_max": 10}}"#).unwrap();

        let ctx = load_context(&dir.path().join("c.db"), Some(&config_path)).unwrap();
        assert_eq!(ctx.config().limits.query_limit_max, 10);
    }

    #[test]
    fn test_load_context_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("gomment.json");
        std::fs::write(&config_path, r#"{"limits": {"comment_depth_max": -1}}"#).unwrap();

        let err = load_context(&dir.path().join("c.db"), Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("comment_depth_max"));
    }

    #[test]
    fn test_explain_adds_hint_for_missing_parent() {
        let err = explain(
            CoreError::ParentNotFound {
                parent_id: 9,
                thread_path: "/blog".to_string(),
            },
            "/blog",
        );
        let message = err.to_string();
        assert!(message.contains("Parent comment 9"));
        assert!(message.contains("To fix: gomment show --thread /blog"));
    }
}
