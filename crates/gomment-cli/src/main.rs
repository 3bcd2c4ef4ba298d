//! gomment - threaded page comments stored in SQLite

mod cli;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::commands::{load_context, run_migrate, run_more, run_post, run_show, run_threads};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let ctx = load_context(&cli.db, cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Post {
            thread,
            parent,
            author,
            email,
            text,
        } => {
            run_post(
                &ctx,
                &thread,
                parent,
                &author,
                email.as_deref(),
                &text,
                format,
            )?;
        }

        Commands::Show {
            thread,
            order,
            parent,
            depth,
            max,
        } => {
            run_show(&ctx, &thread, order, parent, depth, max, format)?;
        }

        Commands::More {
            thread_id,
            parent,
            newest,
            exclude,
            limit,
            order,
        } => {
            run_more(
                &ctx, thread_id, parent, newest, &exclude, limit, order, format,
            )?;
        }

        Commands::Threads => {
            run_threads(&ctx, format)?;
        }

        Commands::Migrate => {
            run_migrate(&ctx, format)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays parseable.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::new(filter_directive(
        verbose,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    ));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// `-v` wins over `RUST_LOG`, which wins over the `warn` default.
fn filter_directive(verbose: u8, rust_log: Option<String>) -> String {
    match verbose {
        0 => rust_log
            .filter(|directive| !directive.trim().is_empty())
            .unwrap_or_else(|| "warn".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_defaults_to_warn() {
        assert_eq!(filter_directive(0, None), "warn");
        assert_eq!(filter_directive(0, Some("  ".to_string())), "warn");
    }

    #[test]
    fn test_filter_directive_uses_rust_log() {
        assert_eq!(
            filter_directive(0, Some("gomment_core=info".to_string())),
            "gomment_core=info"
        );
    }

    #[test]
    fn test_verbose_overrides_rust_log() {
        assert_eq!(filter_directive(1, Some("error".to_string())), "debug");
        assert_eq!(filter_directive(3, None), "trace");
    }
}
