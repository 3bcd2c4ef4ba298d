//! Schema version tracking and ordered migrations.
//!
//! The version lives in `PRAGMA user_version`. On open, the migration
//! registered for the current version runs (each one bumps the version) until
//! no migration is registered for the resulting version.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::errors::{CoreError, CoreResult, StorageContext};

/// Schema version a fully migrated database reports.
pub const SCHEMA_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> CoreResult<()>;

/// A migration that upgrades a database from `from_version`.
#[derive(Clone, Copy)]
pub(crate) struct Migration {
    pub from_version: u32,
    pub name: &'static str,
    pub apply: MigrationFn,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        from_version: 0,
        name: "create_db",
        apply: create_db,
    },
    Migration {
        from_version: 1,
        name: "migration_1_to_2",
        apply: migration_1_to_2,
    },
];

/// Read the schema version stored in the database.
pub fn schema_version(conn: &Connection) -> CoreResult<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .storage("error while retrieving DB schema version")
}

fn set_schema_version(conn: &Connection, version: u32) -> CoreResult<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .storage("error while setting DB schema version")
}

/// Bring the schema up to date. Returns the final schema version.
pub fn run_migrations(conn: &Connection) -> CoreResult<u32> {
    run_migrations_with(conn, MIGRATIONS)
}

pub(crate) fn run_migrations_with(conn: &Connection, migrations: &[Migration]) -> CoreResult<u32> {
    loop {
        // Immediate transactions serialize concurrent first opens of a fresh file.
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
            .storage("failed to begin migration transaction")?;

        let version = schema_version(&tx)?;
        let Some(migration) = migrations.iter().find(|m| m.from_version == version) else {
            tx.commit().storage("failed to commit migration check")?;
            return Ok(version);
        };

        tracing::info!(migration = migration.name, version, "running DB migration");
        (migration.apply)(&tx).map_err(|e| CoreError::Migration {
            from_version: version,
            reason: e.to_string(),
        })?;

        let new_version = schema_version(&tx)?;
        if new_version <= version {
            return Err(CoreError::Migration {
                from_version: version,
                reason: format!(
                    "migration '{}' did not increase the schema version",
                    migration.name
                ),
            });
        }

        tx.commit().map_err(|e| CoreError::Migration {
            from_version: version,
            reason: format!("failed to commit: {e}"),
        })?;
        tracing::info!(from = version, to = new_version, "DB migration changed schema version");
    }
}

const CREATE_SCHEMA_SQL: &str = r"
CREATE TABLE thread (
    thread_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT UNIQUE,
    path TEXT NOT NULL UNIQUE,
    num_total INTEGER NOT NULL DEFAULT 1,
    num_root INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE comment (
    comment_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT UNIQUE,
    thread_id INTEGER NOT NULL,
    parent_id INTEGER DEFAULT NULL,
    num_children INTEGER NOT NULL DEFAULT 0,
    depth_level INTEGER NOT NULL DEFAULT 0,
    verified INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    edited_at INTEGER DEFAULT NULL,
    touched_at INTEGER NOT NULL,
    author TEXT NOT NULL,
    email TEXT DEFAULT NULL,
    text TEXT NOT NULL,
    FOREIGN KEY(thread_id) REFERENCES thread (thread_id),
    FOREIGN KEY(parent_id) REFERENCES comment (comment_id)
);

CREATE INDEX thread_index ON comment (thread_id ASC);
";

fn create_db(conn: &Connection) -> CoreResult<()> {
    conn.execute_batch(CREATE_SCHEMA_SQL)
        .storage("creation of the initial schema failed")?;
    set_schema_version(conn, SCHEMA_VERSION)
}

/// Upgrade a version 1 database: add the thread index and, for databases
/// created before nesting depth was stored, back-fill `depth_level`.
fn migration_1_to_2(conn: &Connection) -> CoreResult<()> {
    if !comment_has_column(conn, "depth_level")? {
        conn.execute_batch(
            "ALTER TABLE comment ADD COLUMN depth_level INTEGER NOT NULL DEFAULT 0;
             WITH RECURSIVE depths(comment_id, lvl) AS (
                 SELECT comment_id, 0 FROM comment WHERE parent_id IS NULL
                 UNION ALL
                 SELECT c.comment_id, d.lvl + 1 FROM comment c
                 JOIN depths d ON c.parent_id = d.comment_id
             )
             UPDATE comment SET depth_level = COALESCE(
                 (SELECT lvl FROM depths WHERE depths.comment_id = comment.comment_id), 0
             );",
        )
        .storage("back-filling 'depth_level' failed")?;
    }

    conn.execute_batch("CREATE INDEX IF NOT EXISTS thread_index ON comment (thread_id ASC);")
        .storage("creation of index 'thread_index' failed")?;
    set_schema_version(conn, 2)
}

fn comment_has_column(conn: &Connection, column: &str) -> CoreResult<bool> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('comment')")
        .storage("failed to inspect comment table")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .storage("failed to inspect comment table")?;

    for name in names {
        if name.storage("failed to read column name")? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
