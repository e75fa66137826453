//! Scorecard indexer.

use std::sync::Arc;

use crate::asset::{Asset, AssetType};
use crate::error::{Result, RuledexError};
use crate::indexer::AssetIndexer;
use crate::indexer::builder::{DocumentBuilder, ReferenceResolver};
use crate::model::{DataModel, ScoreCardModel};
use crate::term::{AssetPath, IndexDocument};

/// Indexes the score target, the reason code field and every
/// characteristic's fact field.
pub struct ScoreCardIndexer {
    data_model: Arc<DataModel>,
}

impl ScoreCardIndexer {
    pub fn new(data_model: Arc<DataModel>) -> Self {
        ScoreCardIndexer { data_model }
    }

    pub fn index_model(&self, path: &AssetPath, model: &ScoreCardModel) -> IndexDocument {
        let resolver =
            ReferenceResolver::new(&model.imports, &model.package_name, &self.data_model);
        let mut builder = DocumentBuilder::new();
        builder.add_package(&model.package_name);

        if !model.fact_name.trim().is_empty() {
            let fqcn = resolver.reference_type(&mut builder, &model.fact_name);
            resolver.reference_field(&mut builder, Some(&fqcn), &model.field_name, None);
            if model.use_reason_codes {
                resolver.reference_field(&mut builder, Some(&fqcn), &model.reason_code_field, None);
            }
        }

        for characteristic in &model.characteristics {
            if characteristic.fact.trim().is_empty() {
                continue;
            }
            let fqcn = resolver.reference_type(&mut builder, &characteristic.fact);
            resolver.reference_field(
                &mut builder,
                Some(&fqcn),
                &characteristic.field,
                Some(&characteristic.data_type),
            );
        }

        builder.build(path, AssetType::ScoreCard.as_str())
    }
}

impl AssetIndexer for ScoreCardIndexer {
    fn asset_type(&self) -> AssetType {
        AssetType::ScoreCard
    }

    fn index_asset(&self, path: &AssetPath, asset: &Asset) -> Result<IndexDocument> {
        match asset {
            Asset::ScoreCard(model) => Ok(self.index_model(path, model)),
            other => Err(RuledexError::invalid_argument(format!(
                "Scorecard indexer cannot index a {} asset",
                other.asset_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Characteristic;
    use crate::term::{IndexTerm, IndexableElement};

    fn scorecard() -> ScoreCardModel {
        let mut model = ScoreCardModel::new("sc1");
        model.package_name = "org.mortgages".to_string();
        model.imports.add("org.mortgages.Applicant");
        model.imports.add("org.mortgages.Mortgage");
        model.fact_name = "Applicant".to_string();
        model.field_name = "score".to_string();
        model.reason_code_field = "reason".to_string();
        model.characteristics.push(Characteristic {
            name: "amount".to_string(),
            fact: "Mortgage".to_string(),
            field: "amount".to_string(),
            data_type: "Integer".to_string(),
            ..Default::default()
        });
        model
    }

    fn data_model() -> Arc<DataModel> {
        Arc::new(
            DataModel::builder()
                .field("org.mortgages.Applicant", "score", "Double")
                .field("org.mortgages.Applicant", "reason", "String")
                .build(),
        )
    }

    #[test]
    fn test_terms() {
        let indexer = ScoreCardIndexer::new(data_model());
        let path = AssetPath::new("/p/sc1.scgd").unwrap();
        let doc = indexer.index_model(&path, &scorecard());

        assert_eq!(doc.asset_type, "scorecard");
        let types: Vec<_> = doc.values(IndexableElement::TypeName).collect();
        assert_eq!(
            types,
            vec![
                "java.lang.Double",
                "java.lang.Integer",
                "org.mortgages.Applicant",
                "org.mortgages.Mortgage"
            ]
        );
        assert!(doc.contains(&IndexTerm::field_type_name("amount")));
        assert!(doc.contains(&IndexTerm::field_type_fqcn("java.lang.Integer")));
        assert!(doc.contains(&IndexTerm::package_name("org.mortgages")));
        // reason codes are off
        assert!(!doc.contains(&IndexTerm::field_type_name("reason")));
    }

    #[test]
    fn test_reason_code_field() {
        let mut model = scorecard();
        model.use_reason_codes = true;

        let indexer = ScoreCardIndexer::new(data_model());
        let doc = indexer.index_model(&AssetPath::new("/sc.scgd").unwrap(), &model);
        assert!(doc.contains(&IndexTerm::field_type_name("reason")));
        assert!(doc.contains(&IndexTerm::field_type_fqcn("java.lang.String")));
    }

    #[test]
    fn test_unreferenced_import_emits_nothing() {
        let mut model = scorecard();
        model.characteristics.clear();

        let indexer = ScoreCardIndexer::new(data_model());
        let doc = indexer.index_model(&AssetPath::new("/sc.scgd").unwrap(), &model);
        assert!(!doc.contains(&IndexTerm::type_name("org.mortgages.Mortgage")));
        assert!(doc.contains(&IndexTerm::type_name("org.mortgages.Applicant")));
    }

    #[test]
    fn test_rejects_other_assets() {
        let indexer = ScoreCardIndexer::new(data_model());
        let asset = Asset::GuidedRule(crate::model::RuleModel::new("r"));
        assert!(indexer.index_asset(&AssetPath::new("/r.scgd").unwrap(), &asset).is_err());
        assert!(indexer.supports(&AssetPath::new("/x/y.scgd").unwrap()));
        assert!(!indexer.supports(&AssetPath::new("/x/y.rdrl").unwrap()));
    }
}
