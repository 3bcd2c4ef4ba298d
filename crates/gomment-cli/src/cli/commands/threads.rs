//! Implementation of `gomment threads` and `gomment migrate`.

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::helpers::open_services;
use crate::output::{Formatter, OutputFormat};
use gomment_core::core::CoreContext;

/// List all threads with their counters.
pub fn run_threads(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let threads = services.threads().list()?;

    Formatter::new(format).print_list(&threads, "No threads yet.", "threads")
}

#[derive(Debug, Serialize)]
struct SchemaStatus {
    db: String,
    schema_version: u32,
}

/// Open the database, which applies pending migrations, and report the version.
pub fn run_migrate(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let schema_version = services.store().schema_version()?;
    tracing::info!(schema_version, "database schema is up to date");

    Formatter::new(format).print(&SchemaStatus {
        db: ctx.db_path().display().to_string(),
        schema_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomment_core::store::SCHEMA_VERSION;
    use gomment_core::EngineConfig;
    use tempfile::tempdir;

    #[test]
    fn test_migrate_creates_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("new").join("comments.db");
        let ctx = CoreContext::new(&db_path, EngineConfig::default()).unwrap();

        run_migrate(&ctx, OutputFormat::Json).unwrap();
        assert!(db_path.exists());
        assert_eq!(
            ctx.services().unwrap().store().schema_version().unwrap(),
            SCHEMA_VERSION
        );
    }

    #[test]
    fn test_threads_on_empty_database() {
        let dir = tempdir().unwrap();
        let ctx = CoreContext::new(&dir.path().join("c.db"), EngineConfig::default()).unwrap();
        run_threads(&ctx, OutputFormat::Text).unwrap();
        run_threads(&ctx, OutputFormat::Json).unwrap();
    }
}
