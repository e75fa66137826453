//! Guided rule indexer.

use std::sync::Arc;

use crate::asset::{Asset, AssetType};
use crate::error::{Result, RuledexError};
use crate::indexer::AssetIndexer;
use crate::indexer::builder::{DocumentBuilder, ReferenceResolver};
use crate::model::{DataModel, RuleAction, RuleModel};
use crate::term::{AssetPath, IndexDocument};

/// Indexes a guided rule's name, attributes, patterns and actions.
pub struct GuidedRuleIndexer {
    data_model: Arc<DataModel>,
}

impl GuidedRuleIndexer {
    pub fn new(data_model: Arc<DataModel>) -> Self {
        GuidedRuleIndexer { data_model }
    }

    pub fn index_model(&self, path: &AssetPath, rule: &RuleModel) -> IndexDocument {
        let resolver = ReferenceResolver::new(&rule.imports, &rule.package_name, &self.data_model);
        let mut builder = DocumentBuilder::new();
        builder.add_package(&rule.package_name);
        builder.add_rule_name(&rule.name);

        for attribute in &rule.attributes {
            builder.add_rule_attribute(&attribute.name, &attribute.value);
        }

        for pattern in &rule.lhs {
            let fqcn = resolver.reference_type(&mut builder, &pattern.fact_type);
            for constraint in &pattern.constraints {
                resolver.reference_field(
                    &mut builder,
                    Some(&fqcn),
                    &constraint.field_name,
                    constraint.field_type.as_deref(),
                );
            }
        }

        for action in &rule.rhs {
            match action {
                RuleAction::SetField(set) => {
                    let fqcn = rule
                        .bound_type(&set.variable)
                        .map(|t| resolver.reference_type(&mut builder, t));
                    resolver.reference_field(
                        &mut builder,
                        fqcn.as_deref(),
                        &set.field,
                        set.field_type.as_deref(),
                    );
                }
                RuleAction::InsertFact(insert) => {
                    let fqcn = resolver.reference_type(&mut builder, &insert.fact_type);
                    for field in &insert.fields {
                        resolver.reference_field(&mut builder, Some(&fqcn), &field.name, None);
                    }
                }
            }
        }

        builder.build(path, AssetType::GuidedRule.as_str())
    }
}

impl AssetIndexer for GuidedRuleIndexer {
    fn asset_type(&self) -> AssetType {
        AssetType::GuidedRule
    }

    fn index_asset(&self, path: &AssetPath, asset: &Asset) -> Result<IndexDocument> {
        match asset {
            Asset::GuidedRule(rule) => Ok(self.index_model(path, rule)),
            other => Err(RuledexError::invalid_argument(format!(
                "Guided rule indexer cannot index a {} asset",
                other.asset_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{IndexTerm, IndexableElement};

    const RULE: &str = r#"{
        "name": "Approve Loan",
        "package_name": "org.mortgages",
        "imports": ["org.mortgages.Mortgage"],
        "attributes": [{"name": "no-loop", "value": "true"},
                       {"name": "agenda-group", "value": "risk"}],
        "lhs": [{"fact_type": "Mortgage", "bound_name": "m",
                 "constraints": [{"field_name": "amount", "operator": ">", "value": "1000"}]}],
        "rhs": [{"action": "set_field", "variable": "m", "field": "approved",
                 "value": "true", "field_type": "Boolean"},
                {"action": "insert_fact", "fact_type": "org.audit.Entry",
                 "fields": [{"name": "message", "value": "approved"}]}]
    }"#;

    fn data_model() -> Arc<DataModel> {
        Arc::new(
            DataModel::builder()
                .field("org.mortgages.Mortgage", "amount", "Integer")
                .field("org.audit.Entry", "message", "String")
                .build(),
        )
    }

    #[test]
    fn test_index_content() {
        let indexer = GuidedRuleIndexer::new(data_model());
        let path = AssetPath::new("/org/mortgages/approve.rdrl").unwrap();
        let doc = indexer.index_content(&path, RULE).unwrap();

        assert_eq!(doc.asset_type, "guided_rule");
        assert!(doc.contains(&IndexTerm::rule_name("Approve Loan")));
        assert!(doc.contains(&IndexTerm::rule_attribute_name("no-loop")));
        assert!(doc.contains(&IndexTerm::rule_attribute_value("risk")));
        assert!(doc.contains(&IndexTerm::type_name("org.mortgages.Mortgage")));
        assert!(doc.contains(&IndexTerm::type_name("org.audit.Entry")));
        assert!(doc.contains(&IndexTerm::field_type_fqcn("java.lang.Integer")));
        assert!(doc.contains(&IndexTerm::field_type_fqcn("java.lang.Boolean")));
        assert!(doc.contains(&IndexTerm::field_type_fqcn("java.lang.String")));
        assert_eq!(
            doc.values(IndexableElement::FieldTypeName).collect::<Vec<_>>(),
            vec!["amount", "approved", "message"]
        );
    }

    #[test]
    fn test_malformed_content() {
        let indexer = GuidedRuleIndexer::new(data_model());
        let path = AssetPath::new("/r.rdrl").unwrap();
        assert!(indexer.index_content(&path, "{\"name\": 5}").is_err());
    }
}
