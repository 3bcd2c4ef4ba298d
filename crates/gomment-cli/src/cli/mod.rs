//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use gomment_core::SortPolicy;

use crate::output::OutputFormat;

pub mod commands;

/// Threaded page comments stored in SQLite
#[derive(Parser, Debug)]
#[command(name = "gomment")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the comment database
    #[arg(long, global = true, env = "GOMMENT_DB", default_value = "gomment.db")]
    pub db: PathBuf,

    /// Path to the engine configuration (JSON). Defaults apply when omitted
    #[arg(long, global = true, env = "GOMMENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Log more (-v debug, -vv trace). Overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post a comment, stamped with the current time
    Post {
        /// Thread path (e.g. the page URL path)
        #[arg(long)]
        thread: String,

        /// Comment to reply to (omit for a root comment)
        #[arg(long)]
        parent: Option<i64>,

        /// Display name of the author
        #[arg(long)]
        author: String,

        /// Email of the author (stored, never shown to readers)
        #[arg(long)]
        email: Option<String>,

        /// Comment text
        text: String,
    },

    /// Show the comment tree of a thread
    Show {
        /// Thread path
        #[arg(long)]
        thread: String,

        /// Ordering policy
        #[arg(long, value_enum, default_value_t)]
        order: SortPolicy,

        /// Show only the subtree below this comment
        #[arg(long)]
        parent: Option<i64>,

        /// Maximum nesting depth
        #[arg(long, default_value_t = 3)]
        depth: i64,

        /// Maximum number of comments
        #[arg(long, default_value_t = 50)]
        max: i64,
    },

    /// Load the next page of siblings
    More {
        /// Thread id (as printed by `show` or `threads`)
        #[arg(long)]
        thread_id: i64,

        /// Parent comment (omit for root comments)
        #[arg(long)]
        parent: Option<i64>,

        /// Only comments created at or before this unix timestamp
        #[arg(long)]
        newest: i64,

        /// Comment ids already shown, ascending (comma separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<i64>,

        /// Maximum number of comments
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Ordering policy
        #[arg(long, value_enum, default_value_t)]
        order: SortPolicy,
    },

    /// List all threads
    Threads,

    /// Create or upgrade the database schema and print its version
    Migrate,
}
