//! Command line argument parsing for the ruledex CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// ruledex - term index and query tool for rule assets
#[derive(Parser, Debug, Clone)]
#[command(name = "ruledex")]
#[command(about = "Index rule assets by the types, fields and rules they reference")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct RuledexArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "RULEDEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl RuledexArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index every asset under a directory, replacing the index content
    Index(IndexArgs),

    /// Find assets containing all given terms
    Query(QueryArgs),

    /// Remove an asset from the index
    Remove(RemoveArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Show the terms indexed for an asset
    Show(ShowArgs),
}

/// Arguments for indexing a directory of assets
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Directory holding the assets
    #[arg(value_name = "ASSETS_DIR")]
    pub assets_dir: PathBuf,

    /// Data model file (JSON) used to resolve field classes
    #[arg(short, long, value_name = "DATA_MODEL")]
    pub data_model: Option<PathBuf>,
}

/// Arguments for querying
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Required term, as FIELD=VALUE (repeatable)
    #[arg(short, long = "term", value_name = "FIELD=VALUE")]
    pub terms: Vec<String>,

    /// Optional term, at least one must match when no --term is given
    #[arg(long = "should", value_name = "FIELD=VALUE")]
    pub should: Vec<String>,

    /// Excluded term
    #[arg(long = "must-not", value_name = "FIELD=VALUE")]
    pub must_not: Vec<String>,

    /// Maximum number of paths to return
    #[arg(short, long, default_value = "100")]
    pub limit: usize,
}

impl QueryArgs {
    /// Whether the query is a plain conjunction of required terms.
    pub fn is_conjunctive(&self) -> bool {
        self.should.is_empty() && self.must_not.is_empty()
    }
}

/// Arguments for removing an asset
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Asset path, e.g. /org/mortgages/rates.scgd
    #[arg(value_name = "ASSET_PATH")]
    pub asset_path: String,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

/// Arguments for showing one document
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Asset path
    #[arg(value_name = "ASSET_PATH")]
    pub asset_path: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
