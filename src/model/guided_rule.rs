//! Guided rule model.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::model::imports::Imports;
use crate::model::scenario::FieldData;

/// A rule built from fact patterns (LHS) and actions (RHS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleModel {
    pub name: String,
    pub package_name: String,
    pub imports: Imports,
    pub attributes: Vec<RuleAttribute>,
    pub lhs: Vec<FactPattern>,
    pub rhs: Vec<RuleAction>,
}

/// e.g. `no-loop true`, `salience 10`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactPattern {
    pub fact_type: String,
    pub bound_name: Option<String>,
    pub constraints: Vec<FieldConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConstraint {
    pub field_name: String,
    /// Declared type when the editor recorded it.
    pub field_type: Option<String>,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RuleAction {
    /// Assign a field on a bound fact.
    SetField(ActionFieldValue),
    /// Insert a new fact.
    InsertFact(ActionInsertFact),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionFieldValue {
    pub variable: String,
    pub field: String,
    pub value: String,
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionInsertFact {
    pub fact_type: String,
    pub fields: Vec<FieldData>,
}

impl RuleModel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        RuleModel {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Fact type bound to `variable` on the LHS, as written.
    pub fn bound_type(&self, variable: &str) -> Option<&str> {
        self.lhs
            .iter()
            .find(|pattern| pattern.bound_name.as_deref() == Some(variable))
            .map(|pattern| pattern.fact_type.as_str())
    }

    /// Reject structurally broken rules.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RuledexError::parse("Rule has no name"));
        }
        if let Some(attribute) = self.attributes.iter().find(|a| a.name.trim().is_empty()) {
            return Err(RuledexError::parse(format!(
                "Rule '{}' has an attribute without a name (value '{}')",
                self.name, attribute.value
            )));
        }
        if self.lhs.iter().any(|pattern| pattern.fact_type.trim().is_empty()) {
            return Err(RuledexError::parse(format!(
                "Rule '{}' has a pattern without a fact type",
                self.name
            )));
        }
        for action in &self.rhs {
            if let RuleAction::SetField(set) = action
                && self.bound_type(&set.variable).is_none()
            {
                return Err(RuledexError::parse(format!(
                    "Rule '{}' sets a field on unbound variable '{}'",
                    self.name, set.variable
                )));
            }
        }
        Ok(())
    }
}
