mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::*;
use ruledex::error::Result;
use ruledex::service::{IndexingConfig, IndexingService};
use ruledex::term::IndexTerm;
use ruledex::vfs::{AssetStore, DirectoryAssetStore, MemoryAssetStore, Revision};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn start(store: Arc<dyn AssetStore>) -> Result<IndexingService> {
    let config = IndexingConfig {
        poll_interval_ms: 5,
        ..Default::default()
    };
    IndexingService::start(store, Arc::new(memory_store()?), registry(), config)
}

#[test]
fn test_writes_become_searchable() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    let index = Arc::clone(service.index());

    let both = path("/org/mortgages/both.scgd");
    let applicant = path("/org/mortgages/applicant.scgd");
    assets.write(
        &both,
        &content(&scorecard("both", &[("Applicant", "age"), ("Mortgage", "amount")])),
    )?;
    let revision = assets.write(
        &applicant,
        &content(&scorecard("applicant", &[("Applicant", "age")])),
    )?;
    service.wait_until_processed(revision, WAIT)?;

    assert_eq!(
        index.query(&[IndexTerm::type_name("applicant")])?,
        vec![applicant.clone(), both.clone()]
    );
    assert_eq!(index.query(&[IndexTerm::type_name("mortgage")])?, vec![both.clone()]);

    // Editing the asset replaces its terms
    let revision = assets.write(&both, &content(&scorecard("both", &[("Applicant", "age")])))?;
    service.wait_until_processed(revision, WAIT)?;
    assert!(index.query(&[IndexTerm::type_name("mortgage")])?.is_empty());

    // Deleting removes it from every result
    let revision = assets.delete(&applicant)?;
    service.wait_until_processed(revision, WAIT)?;
    assert_eq!(index.query(&[IndexTerm::type_name("applicant")])?, vec![both]);

    let stats = service.stats();
    assert_eq!(stats.indexed, 3);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.failed, 0);

    service.stop()?;
    Ok(())
}

#[test]
fn test_rename_and_unsupported_assets() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    let index = Arc::clone(service.index());

    let draft = path("/tests/draft.scenario");
    let renamed = path("/tests/mortgage.scenario");
    assets.write(&draft, &content(&scenario("draft", true)))?;
    assets.write(&path("/README.md"), "not an asset")?;
    let revision = assets.rename(&draft, &renamed)?;
    service.wait_until_processed(revision, WAIT)?;

    assert_eq!(index.query(&[IndexTerm::type_name("mortgage")])?, vec![renamed]);
    assert!(!index.contains(&draft));

    let stats = service.stats();
    assert_eq!(stats.renamed, 1);
    assert_eq!(stats.skipped, 1);

    service.stop()?;
    Ok(())
}

#[test]
fn test_malformed_asset_is_counted_and_skipped() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    let index = Arc::clone(service.index());

    assets.write(&path("/broken.rdrl"), "{ not json")?;
    let good = path("/approve.rdrl");
    let revision = assets.write(&good, &content(&guided_rule("approve", &[("no-loop", "true")])))?;
    service.wait_until_processed(revision, WAIT)?;

    assert_eq!(index.query(&[IndexTerm::rule_attribute_name("no-loop")])?, vec![good]);
    assert_eq!(service.stats().failed, 1);
    assert!(service.processed_sequence() >= revision);

    service.stop()?;
    Ok(())
}

#[test]
fn test_wait_after_stop_fails() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    service.stop()?;
    assert!(!service.is_running());

    let revision = assets.write(&path("/late.rdrl"), &content(&guided_rule("late", &[])))?;
    assert!(service.wait_until_processed(revision, WAIT).is_err());
    Ok(())
}

#[test]
fn test_reindex_directory() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let assets = Arc::new(DirectoryAssetStore::open(dir.path())?);
    let card = path("/org/mortgages/rates.scgd");
    let test = path("/org/mortgages/rates.scenario");
    assets.write(&card, &content(&scorecard("rates", &[("Mortgage", "amount")])))?;
    assets.write(&test, &content(&scenario("rates", false)))?;

    let service = start(assets.clone())?;
    service.wait_until_caught_up()?;
    assert_eq!(service.reindex_all()?, 2);

    let index = service.index();
    assert_eq!(index.query(&[IndexTerm::type_name("mortgage")])?, vec![card.clone()]);
    assert_eq!(index.query(&[IndexTerm::type_name("applicant")])?, vec![test, card]);

    service.stop()?;
    Ok(())
}

#[test]
fn test_reindex_during_writes_keeps_latest_content() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    let index = Arc::clone(service.index());
    let rule = path("/rules/approve.rdrl");

    let writer = {
        let assets = assets.clone();
        let rule = rule.clone();
        thread::spawn(move || -> Result<Revision> {
            let mut revision = 0;
            for version in 0..50 {
                let model = guided_rule(&format!("v{version}"), &[]);
                revision = assets.write(&rule, &content(&model))?;
            }
            Ok(revision)
        })
    };
    for _ in 0..5 {
        service.reindex_all()?;
    }
    let last = writer.join().unwrap()?;
    service.wait_until_processed(last, WAIT)?;

    assert_eq!(index.query(&[IndexTerm::rule_name("v49")])?, vec![rule]);
    for version in 0..49 {
        let stale = IndexTerm::rule_name(format!("v{version}"));
        assert!(index.query(&[stale])?.is_empty(), "v{version} still indexed");
    }

    service.stop()?;
    Ok(())
}

#[test]
fn test_reindex_after_stop_fails() -> Result<()> {
    let service = start(Arc::new(MemoryAssetStore::new()))?;
    service.stop()?;
    assert!(service.reindex_all().is_err());
    Ok(())
}

#[test]
fn test_failed_refresh_leaves_revision_pending() -> Result<()> {
    let assets = Arc::new(MemoryAssetStore::new());
    let service = start(assets.clone())?;
    let index = Arc::clone(service.index());

    let revision = assets.write(&path("/first.rdrl"), &content(&guided_rule("first", &[])))?;
    service.wait_until_processed(revision, WAIT)?;

    index.close()?;
    let revision = assets.write(&path("/second.rdrl"), &content(&guided_rule("second", &[])))?;
    let err = service
        .wait_until_processed(revision, Duration::from_millis(200))
        .unwrap_err();
    assert!(err.is_timeout(), "unexpected error: {err}");
    assert!(service.processed_sequence() < revision);

    service.stop()?;
    Ok(())
}
