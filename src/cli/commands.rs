//! Command implementations for the ruledex CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::RuledexConfig;
use crate::error::{Result, RuledexError};
use crate::index::IndexStore;
use crate::indexer::IndexerRegistry;
use crate::model::DataModel;
use crate::query::{Occur, Query, QueryBuilder};
use crate::service::IndexingService;
use crate::storage::StorageConfig;
use crate::storage::file::FileStorageConfig;
use crate::term::{AssetPath, IndexTerm};
use crate::vfs::{AssetStore, DirectoryAssetStore};

/// Execute a CLI command.
pub fn execute_command(args: RuledexArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => RuledexConfig::from_file(path)?,
        None => RuledexConfig::default(),
    };

    match &args.command {
        Command::Index(index_args) => index_assets(index_args, &config, &args),
        Command::Query(query_args) => query_index(query_args, &config, &args),
        Command::Remove(remove_args) => remove_asset(remove_args, &config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &config, &args),
        Command::Show(show_args) => show_document(show_args, &config, &args),
    }
}

/// Open the index stored under `index_path`.
fn open_index(index_path: &Path, config: &RuledexConfig, create: bool) -> Result<IndexStore> {
    if !create && !index_path.is_dir() {
        return Err(RuledexError::not_found(format!(
            "index directory {}",
            index_path.display()
        )));
    }

    let mut index_config = config.index.clone();
    index_config.storage = StorageConfig::File(FileStorageConfig::new(index_path));
    IndexStore::open(index_config)
}

/// Index every asset under a directory.
fn index_assets(args: &IndexArgs, config: &RuledexConfig, cli_args: &RuledexArgs) -> Result<()> {
    let start_time = Instant::now();

    let data_model = match &args.data_model {
        Some(path) => DataModel::from_json_file(path)?,
        None => config.load_data_model()?,
    };
    let registry = IndexerRegistry::with_defaults(Arc::new(data_model));

    let assets = Arc::new(DirectoryAssetStore::open(&args.assets_dir)?);
    let listed = assets.list()?;
    let skipped = listed.iter().filter(|path| !registry.supports(path)).count() as u64;

    let index = Arc::new(open_index(&args.index_path, config, true)?);
    let service = IndexingService::start(
        assets.clone(),
        Arc::clone(&index),
        registry,
        config.indexing.clone(),
    )?;
    let indexed = service.reindex_all()?;
    let failed = service.stats().failed;
    service.stop()?;
    index.close()?;

    info!("Indexed {} into {}", args.assets_dir.display(), args.index_path.display());

    output_result(
        "Assets indexed",
        &IndexingResult {
            assets_dir: args.assets_dir.to_string_lossy().to_string(),
            indexed,
            skipped,
            failed,
            doc_count: index.doc_count(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

fn parse_terms(specs: &[String]) -> Result<Vec<IndexTerm>> {
    specs.iter().map(|spec| IndexTerm::parse(spec)).collect()
}

/// Query the index.
fn query_index(args: &QueryArgs, config: &RuledexConfig, cli_args: &RuledexArgs) -> Result<()> {
    let start_time = Instant::now();
    let index = open_index(&args.index_path, config, false)?;

    let mut builder = QueryBuilder::new();
    for (specs, occur) in [
        (&args.terms, Occur::Must),
        (&args.should, Occur::Should),
        (&args.must_not, Occur::MustNot),
    ] {
        for term in parse_terms(specs)? {
            builder = builder.add(term, occur);
        }
    }

    let result = if args.is_conjunctive() {
        let terms = parse_terms(&args.terms)?;
        let mut paths = index.query(&terms)?;
        let total_hits = paths.len() as u64;
        paths.truncate(args.limit);
        QueryResult {
            query: describe(&builder, &index)?,
            paths: paths.iter().map(ToString::to_string).collect(),
            total_hits,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    } else {
        let query = builder.build(index.analyzer())?;
        let results = index.search(&query, args.limit)?;
        QueryResult {
            query: query.description(),
            paths: results.paths().iter().map(ToString::to_string).collect(),
            total_hits: results.total_hits,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    };
    index.close()?;

    output_result("Matching assets", &result, cli_args)
}

fn describe(builder: &QueryBuilder, index: &IndexStore) -> Result<String> {
    if builder.is_empty() {
        return Ok(String::new());
    }
    Ok(builder.build(index.analyzer())?.description())
}

/// Remove an asset from the index.
fn remove_asset(args: &RemoveArgs, config: &RuledexConfig, cli_args: &RuledexArgs) -> Result<()> {
    let index = open_index(&args.index_path, config, false)?;
    let path = AssetPath::new(&args.asset_path)?;

    let removed = index.contains(&path);
    index.remove(&path)?;
    index.commit()?;
    let doc_count = index.doc_count();
    index.close()?;

    output_result(
        "Asset removed",
        &RemovalResult {
            path: path.to_string(),
            removed,
            doc_count,
        },
        cli_args,
    )
}

/// Show index statistics.
fn show_stats(args: &StatsArgs, config: &RuledexConfig, cli_args: &RuledexArgs) -> Result<()> {
    let index = open_index(&args.index_path, config, false)?;
    let stats = index.stats();
    index.close()?;

    output_result("Index statistics", &stats, cli_args)
}

/// Show the document indexed for one asset.
fn show_document(args: &ShowArgs, config: &RuledexConfig, cli_args: &RuledexArgs) -> Result<()> {
    let index = open_index(&args.index_path, config, false)?;
    let path = AssetPath::new(&args.asset_path)?;
    let document = index
        .document(&path)?
        .ok_or_else(|| RuledexError::not_found(format!("asset {path} in the index")))?;
    index.close()?;

    output_result("Indexed document", &document, cli_args)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn run(argv: &[&str]) -> Result<()> {
        let mut full = vec!["ruledex", "--quiet", "--format", "json"];
        full.extend_from_slice(argv);
        execute_command(RuledexArgs::try_parse_from(full).unwrap())
    }

    #[test]
    fn test_index_then_query() {
        let assets = TempDir::new().unwrap();
        let index = TempDir::new().unwrap();
        let store = DirectoryAssetStore::open(assets.path()).unwrap();
        store
            .write(
                &AssetPath::new("rules/approve.rdrl").unwrap(),
                r#"{"name": "approve", "package_name": "org.mortgages",
                    "attributes": [{"name": "no-loop", "value": "true"}]}"#,
            )
            .unwrap();

        let index_path = index.path().join("idx");
        let index_dir = index_path.to_str().unwrap();
        run(&["index", index_dir, assets.path().to_str().unwrap()]).unwrap();

        let reopened = open_index(&index_path, &RuledexConfig::default(), false).unwrap();
        assert_eq!(
            reopened
                .query(&[IndexTerm::rule_attribute_name("no-loop")])
                .unwrap(),
            vec![AssetPath::new("rules/approve.rdrl").unwrap()]
        );
        reopened.close().unwrap();

        run(&["query", index_dir, "--term", "RULE_NAME=approve"]).unwrap();
        run(&["show", index_dir, "/rules/approve.rdrl"]).unwrap();
        run(&["remove", index_dir, "/rules/approve.rdrl"]).unwrap();
        assert!(run(&["show", index_dir, "/rules/approve.rdrl"]).is_err());
    }

    #[test]
    fn test_query_missing_index_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(run(&["stats", missing.to_str().unwrap()]).is_err());
    }

    #[test]
    fn test_malformed_term_fails() {
        let dir = TempDir::new().unwrap();
        let index_dir = dir.path().to_str().unwrap();
        assert!(run(&["query", index_dir, "--term", "TYPE_NAME"]).is_err());
    }
}
