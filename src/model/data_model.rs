//! The data-model oracle: declared field classes per fact type.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};

/// A field declared on a fact type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelField {
    pub name: String,
    /// Fully-qualified class of the field.
    pub class_name: String,
}

/// Fact types known to the project, keyed by fully-qualified name.
///
/// ```
/// use ruledex::model::DataModel;
///
/// let model = DataModel::builder()
///     .field("org.example.Mortgage", "amount", "Integer")
///     .build();
///
/// assert_eq!(
///     model.field_type("org.example.Mortgage", "amount"),
///     Some("java.lang.Integer")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default)]
    types: BTreeMap<String, Vec<ModelField>>,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DataModelBuilder {
        DataModelBuilder::default()
    }

    /// Load a model from JSON of the form
    /// `{"types": {"org.example.Applicant": [{"name": "age", "class_name": "Integer"}]}}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: DataModel = serde_json::from_str(content)?;
        let mut model = DataModel::new();
        for (type_name, fields) in raw.types {
            if type_name.trim().is_empty() {
                return Err(RuledexError::parse("Data model contains an empty type name"));
            }
            for field in fields {
                model.add_field(&type_name, &field.name, &field.class_name);
            }
            model.types.entry(type_name).or_default();
        }
        Ok(model)
    }

    /// Declare (or redeclare) a field. Short class names are qualified.
    pub fn add_field(&mut self, type_name: &str, field: &str, class_name: &str) {
        let class_name = qualify_data_type(class_name);
        let fields = self.types.entry(type_name.to_string()).or_default();
        match fields.iter_mut().find(|f| f.name == field) {
            Some(existing) => existing.class_name = class_name,
            None => fields.push(ModelField {
                name: field.to_string(),
                class_name,
            }),
        }
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn fields(&self, type_name: &str) -> &[ModelField] {
        self.types.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Declared class of `field` on `type_name`.
    pub fn field_type(&self, type_name: &str, field: &str) -> Option<&str> {
        self.fields(type_name)
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.class_name.as_str())
    }

    /// Add every type of `other`, overriding duplicates.
    pub fn merge(&mut self, other: DataModel) {
        for (type_name, fields) in other.types {
            for field in fields {
                self.add_field(&type_name, &field.name, &field.class_name);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct DataModelBuilder {
    model: DataModel,
}

impl DataModelBuilder {
    pub fn fact_type(mut self, type_name: &str) -> Self {
        self.model.types.entry(type_name.to_string()).or_default();
        self
    }

    pub fn field(mut self, type_name: &str, field: &str, class_name: &str) -> Self {
        self.model.add_field(type_name, field, class_name);
        self
    }

    pub fn build(self) -> DataModel {
        self.model
    }
}

/// Fully qualify the short data-type names used in asset content.
///
/// Unknown names are returned trimmed and unchanged.
pub fn qualify_data_type(name: &str) -> String {
    let name = name.trim();
    let qualified = match name {
        "Integer" | "int" => "java.lang.Integer",
        "Double" | "double" => "java.lang.Double",
        "Float" | "float" => "java.lang.Float",
        "Long" | "long" => "java.lang.Long",
        "Short" | "short" => "java.lang.Short",
        "Byte" | "byte" => "java.lang.Byte",
        "Boolean" | "boolean" => "java.lang.Boolean",
        "Character" | "char" => "java.lang.Character",
        "String" => "java.lang.String",
        "Object" => "java.lang.Object",
        "BigDecimal" => "java.math.BigDecimal",
        "BigInteger" => "java.math.BigInteger",
        "Date" => "java.util.Date",
        "List" => "java.util.List",
        "LocalDate" => "java.time.LocalDate",
        other => other,
    };
    qualified.to_string()
}
