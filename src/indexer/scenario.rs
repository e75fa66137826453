//! Test scenario indexer.

use std::sync::Arc;

use log::debug;

use crate::asset::{Asset, AssetType};
use crate::error::{Result, RuledexError};
use crate::indexer::AssetIndexer;
use crate::indexer::builder::{DocumentBuilder, ReferenceResolver};
use crate::model::{DataModel, Fixture, Scenario};
use crate::term::{AssetPath, IndexDocument};

/// Indexes given facts, fact verifications and the rules a scenario names.
pub struct TestScenarioIndexer {
    data_model: Arc<DataModel>,
}

impl TestScenarioIndexer {
    pub fn new(data_model: Arc<DataModel>) -> Self {
        TestScenarioIndexer { data_model }
    }

    pub fn index_model(&self, path: &AssetPath, scenario: &Scenario) -> IndexDocument {
        let resolver =
            ReferenceResolver::new(&scenario.imports, &scenario.package_name, &self.data_model);
        let mut builder = DocumentBuilder::new();
        builder.add_package(&scenario.package_name);

        for rule in &scenario.rules {
            builder.add_rule_name(rule);
        }

        for fixture in &scenario.fixtures {
            match fixture {
                Fixture::FactData(fact) => {
                    let fqcn = resolver.reference_type(&mut builder, &fact.type_name);
                    for field in &fact.fields {
                        resolver.reference_field(&mut builder, Some(&fqcn), &field.name, None);
                    }
                }
                Fixture::VerifyFact(verify) => {
                    let written_type = if verify.any_fact_match {
                        Some(verify.name.as_str())
                    } else {
                        scenario.fact_type_of(&verify.name)
                    };
                    let fqcn = written_type.map(|t| resolver.reference_type(&mut builder, t));
                    if fqcn.is_none() {
                        debug!(
                            "Scenario '{}' verifies undeclared fact '{}'",
                            scenario.name, verify.name
                        );
                    }
                    for field in &verify.fields {
                        resolver.reference_field(
                            &mut builder,
                            fqcn.as_deref(),
                            &field.field_name,
                            None,
                        );
                    }
                }
                Fixture::VerifyRuleFired(verify) => {
                    builder.add_rule_name(&verify.rule_name);
                }
                Fixture::ExecutionTrace(_) => {}
            }
        }

        builder.build(path, AssetType::TestScenario.as_str())
    }
}

impl AssetIndexer for TestScenarioIndexer {
    fn asset_type(&self) -> AssetType {
        AssetType::TestScenario
    }

    fn index_asset(&self, path: &AssetPath, asset: &Asset) -> Result<IndexDocument> {
        match asset {
            Asset::TestScenario(scenario) => Ok(self.index_model(path, scenario)),
            other => Err(RuledexError::invalid_argument(format!(
                "Test scenario indexer cannot index a {} asset",
                other.asset_type()
            ))),
        }
    }
}
