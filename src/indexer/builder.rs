//! Accumulating terms and resolving the references they describe.

use std::collections::BTreeSet;

use log::debug;

use crate::model::{DataModel, Imports, qualify_data_type};
use crate::term::{AssetPath, IndexDocument, IndexTerm};

/// Collects the terms of one document.
///
/// Blank values are ignored and duplicates collapse.
#[derive(Debug, Default, Clone)]
pub struct DocumentBuilder {
    terms: BTreeSet<IndexTerm>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, term: IndexTerm) -> &mut Self {
        if !term.value.trim().is_empty() {
            self.terms.insert(term);
        }
        self
    }

    pub fn add_type(&mut self, fqcn: &str) -> &mut Self {
        self.add_term(IndexTerm::type_name(fqcn))
    }

    /// A referenced field and, when known, its declared class.
    ///
    /// The declared class is recorded both as the field's class and as a
    /// referenced type.
    pub fn add_field(&mut self, field_name: &str, declared_class: Option<&str>) -> &mut Self {
        self.add_term(IndexTerm::field_type_name(field_name));
        if let Some(class_name) = declared_class {
            self.add_term(IndexTerm::field_type_fqcn(class_name));
            self.add_type(class_name);
        }
        self
    }

    pub fn add_rule_name(&mut self, rule_name: &str) -> &mut Self {
        self.add_term(IndexTerm::rule_name(rule_name))
    }

    pub fn add_rule_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.add_term(IndexTerm::rule_attribute_name(name));
        self.add_term(IndexTerm::rule_attribute_value(value))
    }

    pub fn add_package(&mut self, package_name: &str) -> &mut Self {
        self.add_term(IndexTerm::package_name(package_name))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn build(self, path: &AssetPath, asset_type: &str) -> IndexDocument {
        IndexDocument::new(path.clone(), asset_type).with_terms(self.terms)
    }
}

/// Resolves the type and field references of one asset.
pub struct ReferenceResolver<'a> {
    imports: &'a Imports,
    package_name: &'a str,
    data_model: &'a DataModel,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(imports: &'a Imports, package_name: &'a str, data_model: &'a DataModel) -> Self {
        ReferenceResolver {
            imports,
            package_name,
            data_model,
        }
    }

    /// Fully qualify a type name as written in the asset.
    pub fn resolve_type(&self, name: &str) -> String {
        self.imports.resolve_type(name, self.package_name)
    }

    /// The class of `field` on `fqcn`: the declared one if given, else the
    /// data model's.
    pub fn field_class(&self, fqcn: &str, field: &str, declared: Option<&str>) -> Option<String> {
        match declared.map(str::trim).filter(|d| !d.is_empty()) {
            Some(declared) => Some(qualify_data_type(declared)),
            None => self.data_model.field_type(fqcn, field).map(str::to_string),
        }
    }

    /// Record a reference to the type written as `type_name`.
    pub fn reference_type(&self, builder: &mut DocumentBuilder, type_name: &str) -> String {
        let fqcn = self.resolve_type(type_name);
        builder.add_type(&fqcn);
        fqcn
    }

    /// Record a reference to `field` on the already qualified type `fqcn`.
    pub fn reference_field(
        &self,
        builder: &mut DocumentBuilder,
        fqcn: Option<&str>,
        field: &str,
        declared: Option<&str>,
    ) {
        if field.trim().is_empty() {
            return;
        }
        let class_name = match fqcn {
            Some(fqcn) => self.field_class(fqcn, field, declared),
            None => declared
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(qualify_data_type),
        };
        if class_name.is_none() {
            debug!(
                "Unknown type for field '{}' on {}",
                field,
                fqcn.unwrap_or("<unresolved fact>")
            );
        }
        builder.add_field(field, class_name.as_deref());
    }
}
