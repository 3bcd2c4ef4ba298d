//! Implementation of `gomment post`, `gomment show` and `gomment more`.

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::helpers::{explain, open_services};
use crate::output::{Formatter, OutputFormat};
use gomment_core::core::CoreContext;
use gomment_core::{CommentId, NewComment, SortPolicy};

/// Confirmation printed after posting.
#[derive(Debug, Serialize)]
struct Posted<'a> {
    comment_id: CommentId,
    thread: &'a str,
    parent_id: Option<CommentId>,
    created_at: i64,
}

/// Post a comment stamped with the current time.
#[tracing::instrument(skip(ctx, text, email, format))]
pub fn run_post(
    ctx: &CoreContext,
    thread: &str,
    parent: Option<CommentId>,
    author: &str,
    email: Option<&str>,
    text: &str,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;

    let email = email.unwrap_or_default();
    let new = match parent {
        Some(parent_id) => NewComment::reply(thread, parent_id, author, email, text),
        None => NewComment::root(thread, author, email, text),
    };
    let created_at = chrono::Utc::now().timestamp();
    let comment_id = services
        .comments()
        .create(&new, created_at)
        .map_err(|e| explain(e, thread))?;

    Formatter::new(format).print(&Posted {
        comment_id,
        thread,
        parent_id: parent,
        created_at,
    })
}

/// Print the comment tree of a thread.
#[tracing::instrument(skip(ctx, format))]
pub fn run_show(
    ctx: &CoreContext,
    thread: &str,
    order: SortPolicy,
    parent: Option<CommentId>,
    depth: i64,
    max: i64,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let result = services
        .comments()
        .get_comments(order, thread, parent, depth, max)
        .map_err(|e| explain(e, thread))?;

    Formatter::new(format).print_comments(&result)
}

/// Print the next page of siblings.
#[tracing::instrument(skip(ctx, exclude, format))]
pub fn run_more(
    ctx: &CoreContext,
    thread_id: i64,
    parent: Option<CommentId>,
    newest: i64,
    exclude: &[CommentId],
    limit: i64,
    order: SortPolicy,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let page = services
        .comments()
        .get_more(order, thread_id, parent, newest, exclude, limit)
        .map_err(|e| explain(e, ""))?;

    Formatter::new(format).print_list(&page, "No more comments.", "comments")
}
