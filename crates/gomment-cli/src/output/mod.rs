//! Output formatting module for gomment
//!
//! Provides text, JSON, and pretty output formats for CLI output.

use anyhow::Result;
use chrono::DateTime;
use gomment_core::{CommentResult, CommentTree};
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format - machine-readable output
    Json,
    /// Plain text format - concise, one line per record
    #[default]
    Text,
    /// Pretty format - human-friendly comment trees
    Pretty,
}

/// Formatter that can output data in text, JSON, or pretty format
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Create a new formatter with the specified output format
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format data according to the configured output format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(data)?;
                Ok(output)
            }
            OutputFormat::Text | OutputFormat::Pretty => {
                let json_value = serde_json::to_value(data)?;
                Ok(render_text(&json_value))
            }
        }
    }

    /// Format and print data to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let output = self.format(data)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{output}")?;
        Ok(())
    }

    /// Format and print a list with a custom empty message
    ///
    /// For JSON format, wraps the array in a named object with a count field.
    /// For other formats, prints one line per item.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_list<T: Serialize>(
        &self,
        data: &[T],
        empty_message: &str,
        collection_name: &str,
    ) -> Result<()> {
        let output = match self.format {
            OutputFormat::Json => {
                let mut envelope = serde_json::Map::new();
                envelope.insert(collection_name.to_string(), serde_json::to_value(data)?);
                envelope.insert("count".to_string(), serde_json::json!(data.len()));
                serde_json::to_string_pretty(&serde_json::Value::Object(envelope))?
            }
            OutputFormat::Text | OutputFormat::Pretty if data.is_empty() => {
                empty_message.to_string()
            }
            OutputFormat::Text | OutputFormat::Pretty => self.format(&data)?,
        };

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{output}")?;
        Ok(())
    }

    /// Format a tree query result.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn format_comments(&self, result: &CommentResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format(result),
            OutputFormat::Text => Ok(render_tree_text(result)),
            OutputFormat::Pretty => Ok(render_tree_pretty(result)),
        }
    }

    /// Format and print a tree query result to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_comments(&self, result: &CommentResult) -> Result<()> {
        let output = self.format_comments(result)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{output}")?;
        Ok(())
    }
}

/// Render a JSON value as concise text
fn render_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            // ID-like fields first, without a key
            let mut parts = Vec::new();
            let id_keys = ["thread_id", "comment_id"];

            for key in &id_keys {
                if let Some(val) = map.get(*key) {
                    parts.push(render_field_value(val));
                }
            }

            for (key, val) in map {
                if !id_keys.contains(&key.as_str()) {
                    match val {
                        serde_json::Value::Array(arr) if arr.is_empty() => {}
                        serde_json::Value::Null => {}
                        _ => {
                            parts.push(format!("{}:{}", key, render_field_value(val)));
                        }
                    }
                }
            }
            parts.join("  ")
        }
        serde_json::Value::Array(arr) => {
            arr.iter().map(render_text).collect::<Vec<_>>().join("\n")
        }
        _ => render_field_value(value),
    }
}

/// Render a single field value as concise text
fn render_field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => {
            if s.contains(' ') || s.contains('\n') {
                format!("\"{}\"", s.replace('\n', "\\n"))
            } else {
                s.clone()
            }
        }
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(render_field_value).collect();
            format!("[{}]", items.join(","))
        }
        serde_json::Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| format!("{}:{}", k, render_field_value(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

fn summary_line(result: &CommentResult) -> String {
    render_text(&serde_json::json!({
        "thread_id": result.thread_id,
        "num_root": result.num_root,
        "num_total": result.num_total,
        "num_root_payload": result.num_root_payload,
        "num_payload": result.num_payload,
    }))
}

/// Summary line, then one concise line per comment indented by depth
fn render_tree_text(result: &CommentResult) -> String {
    fn walk(trees: &[CommentTree], depth: usize, lines: &mut Vec<String>) {
        for tree in trees {
            let line = serde_json::to_value(&tree.comment)
                .map_or_else(|_| tree.comment.id.to_string(), |v| render_text(&v));
            lines.push(format!("{}{line}", "  ".repeat(depth)));
            walk(&tree.children, depth + 1, lines);
        }
    }

    let mut lines = vec![summary_line(result)];
    walk(&result.comments, 0, &mut lines);
    lines.join("\n")
}

/// Box-drawn tree with readable timestamps
fn render_tree_pretty(result: &CommentResult) -> String {
    fn walk(trees: &[CommentTree], prefix: &str, out: &mut String) {
        for (i, tree) in trees.iter().enumerate() {
            let last = i + 1 == trees.len();
            let (branch, cont) = if last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
            let comment = &tree.comment;

            let replies = match comment.num_children {
                0 => String::new(),
                1 => " · 1 reply".to_string(),
                n => format!(" · {n} replies"),
            };
            out.push_str(&format!(
                "{prefix}{branch}#{} {} · {}{replies}\n",
                comment.id,
                comment.author,
                format_timestamp(comment.created_at)
            ));

            let body_prefix = format!("{prefix}{cont}");
            for line in comment.text.lines() {
                out.push_str(&format!("{body_prefix}  {line}\n"));
            }
            walk(&tree.children, &body_prefix, out);
        }
    }

    let mut out = format!(
        "Thread {}: showing {} of {} comments ({} of {} root)\n",
        result.thread_id,
        result.num_payload,
        result.num_total,
        result.num_root_payload,
        result.num_root
    );
    if result.comments.is_empty() {
        out.push_str("No comments yet.");
        return out;
    }
    walk(&result.comments, "", &mut out);
    out.trim_end().to_string()
}

fn format_timestamp(unix_seconds: i64) -> String {
    DateTime::from_timestamp(unix_seconds, 0).map_or_else(
        || unix_seconds.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}
