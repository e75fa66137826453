//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, RuledexArgs};
use crate::error::Result;

/// Result of indexing a directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingResult {
    pub assets_dir: String,
    pub indexed: usize,
    pub skipped: u64,
    pub failed: u64,
    pub doc_count: u64,
    pub duration_ms: u64,
}

/// Result of a query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub paths: Vec<String>,
    pub total_hits: u64,
    pub duration_ms: u64,
}

/// Result of removing an asset.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovalResult {
    pub path: String,
    pub removed: bool,
    pub doc_count: u64,
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &RuledexArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_human<T: Serialize>(message: &str, result: &T, args: &RuledexArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in human_lines(&value, 0) {
        println!("{line}");
    }
    Ok(())
}

fn output_json<T: Serialize>(result: &T, args: &RuledexArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Render a JSON value as indented `key: value` lines.
fn human_lines(value: &serde_json::Value, indent: usize) -> Vec<String> {
    let spaces = "  ".repeat(indent);
    let mut lines = Vec::new();

    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(inner) if !inner.is_empty() => {
                        lines.push(format!("{spaces}{key}:"));
                        lines.extend(human_lines(val, indent + 1));
                    }
                    serde_json::Value::Array(items) if !items.is_empty() => {
                        lines.push(format!("{spaces}{key}: ({})", items.len()));
                        lines.extend(human_lines(val, indent + 1));
                    }
                    _ => lines.push(format!("{spaces}{key}: {}", format_value(val))),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                match item {
                    serde_json::Value::Object(_) => {
                        lines.push(format!("{spaces}-"));
                        lines.extend(human_lines(item, indent + 1));
                    }
                    _ => lines.push(format!("{spaces}- {}", format_value(item))),
                }
            }
        }
        _ => lines.push(format!("{spaces}{}", format_value(value))),
    }

    lines
}

/// Format a scalar JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::Array(items) if items.is_empty() => "(none)".to_string(),
        other => other.to_string(),
    }
}
