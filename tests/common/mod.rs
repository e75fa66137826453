#![allow(dead_code)]

use std::sync::Arc;

use ruledex::asset::persistence;
use ruledex::error::Result;
use ruledex::index::persistence::is_snapshot_file;
use ruledex::index::{IndexStore, IndexStoreConfig};
use ruledex::indexer::IndexerRegistry;
use ruledex::model::{
    Characteristic, DataModel, FactData, FieldData, Fixture, RuleAttribute, RuleModel,
    ScoreCardModel, Scenario, VerifyFact, VerifyField,
};
use ruledex::storage::file::FileStorageConfig;
use ruledex::storage::{Storage, StorageConfig, StorageFactory};
use ruledex::term::{AssetPath, IndexDocument};
use tempfile::TempDir;

/// Fact types in the default package, so simple names are also their
/// qualified names.
pub fn data_model() -> Arc<DataModel> {
    Arc::new(
        DataModel::builder()
            .field("Applicant", "age", "Integer")
            .field("Applicant", "score", "Double")
            .field("Mortgage", "amount", "Integer")
            .build(),
    )
}

pub fn registry() -> IndexerRegistry {
    IndexerRegistry::with_defaults(data_model())
}

pub const INDEXING_PACKAGE: &str = "org.drools.workbench.screens.indexing";
pub const INDEXING_CLASSES: &str = "org.drools.workbench.screens.indexing.classes";

/// Fact types declared in a `classes` package next to the assets' own.
pub fn packaged_data_model() -> Arc<DataModel> {
    let applicant = format!("{INDEXING_CLASSES}.Applicant");
    let mortgage = format!("{INDEXING_CLASSES}.Mortgage");
    Arc::new(
        DataModel::builder()
            .field(&applicant, "age", "Integer")
            .field(&applicant, "score", "Double")
            .field(&mortgage, "amount", "Integer")
            .build(),
    )
}

pub fn packaged_registry() -> IndexerRegistry {
    IndexerRegistry::with_defaults(packaged_data_model())
}

/// Imports of both `classes` fact types.
pub fn packaged_imports() -> Vec<String> {
    vec![
        format!("{INDEXING_CLASSES}.Applicant"),
        format!("{INDEXING_CLASSES}.Mortgage"),
    ]
}

pub fn path(path: &str) -> AssetPath {
    AssetPath::new(path).unwrap()
}

/// Scorecard scoring applicants, with characteristics on `facts`.
pub fn scorecard(name: &str, facts: &[(&str, &str)]) -> ScoreCardModel {
    let mut model = ScoreCardModel::new(name);
    model.fact_name = "Applicant".to_string();
    model.field_name = "score".to_string();
    for (fact, field) in facts {
        model.characteristics.push(Characteristic {
            name: format!("{fact}.{field}"),
            fact: fact.to_string(),
            field: field.to_string(),
            data_type: "Integer".to_string(),
            ..Default::default()
        });
    }
    model
}

/// Scenario giving an applicant, optionally verifying a mortgage.
pub fn scenario(name: &str, verify_mortgage: bool) -> Scenario {
    let mut scenario = Scenario::new(name);
    scenario.rules.push("approve".to_string());
    scenario.fixtures.push(Fixture::FactData(FactData {
        type_name: "Applicant".to_string(),
        name: "a".to_string(),
        fields: vec![FieldData {
            name: "age".to_string(),
            value: "42".to_string(),
        }],
        is_modify: false,
    }));
    if verify_mortgage {
        scenario.fixtures.push(Fixture::VerifyFact(VerifyFact {
            name: "Mortgage".to_string(),
            fields: vec![VerifyField {
                field_name: "amount".to_string(),
                expected: "1000".to_string(),
                ..Default::default()
            }],
            any_fact_match: true,
        }));
    }
    scenario
}

pub fn guided_rule(name: &str, attributes: &[(&str, &str)]) -> RuleModel {
    let mut rule = RuleModel::new(name);
    rule.package_name = "org.mortgages".to_string();
    for (attribute, value) in attributes {
        rule.attributes.push(RuleAttribute {
            name: attribute.to_string(),
            value: value.to_string(),
        });
    }
    rule
}

/// Scorecard in the indexing package using imported `classes` types.
pub fn packaged_scorecard(name: &str, with_characteristics: bool) -> ScoreCardModel {
    let facts: &[(&str, &str)] = if with_characteristics {
        &[("Applicant", "age"), ("Mortgage", "amount")]
    } else {
        &[]
    };
    let mut model = scorecard(name, facts);
    model.package_name = INDEXING_PACKAGE.to_string();
    model.imports = packaged_imports().into_iter().collect();
    model
}

/// Scenario in the indexing package using imported `classes` types.
pub fn packaged_scenario(name: &str, verify_mortgage: bool) -> Scenario {
    let mut model = scenario(name, verify_mortgage);
    model.package_name = INDEXING_PACKAGE.to_string();
    model.imports = packaged_imports().into_iter().collect();
    model
}

/// Index `model` at `path` against [`packaged_data_model`].
pub fn packaged_document<T: serde::Serialize>(
    path: &AssetPath,
    model: &T,
) -> Result<IndexDocument> {
    packaged_registry().index_content(path, &content(model))
}

/// Persisted JSON for any asset model.
pub fn content<T: serde::Serialize>(model: &T) -> String {
    persistence::marshal_model(model).unwrap()
}

/// Index `model` at `path` through the default indexers.
pub fn document<T: serde::Serialize>(path: &AssetPath, model: &T) -> Result<IndexDocument> {
    registry().index_content(path, &content(model))
}

pub fn store_config(dir: &TempDir, wal_compaction_threshold: usize) -> IndexStoreConfig {
    IndexStoreConfig {
        storage: StorageConfig::File(FileStorageConfig::new(dir.path())),
        wal_compaction_threshold,
    }
}

pub fn open_store(dir: &TempDir) -> Result<IndexStore> {
    IndexStore::open(store_config(dir, 64))
}

pub fn memory_store() -> Result<IndexStore> {
    IndexStore::open(IndexStoreConfig::default())
}

/// Raw access to the files of a closed store.
pub fn file_storage(dir: &TempDir) -> Result<Arc<dyn Storage>> {
    StorageFactory::create(StorageConfig::File(FileStorageConfig::new(dir.path())))
}

/// Document snapshot files present in `dir`, sorted.
pub fn snapshot_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
        .filter(|name| is_snapshot_file(name))
        .collect();
    names.sort();
    names
}
