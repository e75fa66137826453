//! Test scenario model.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::model::imports::Imports;

/// A test scenario: given facts, expected rule firings and fact
/// verifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub package_name: String,
    pub imports: Imports,
    /// Rules the scenario is restricted to (or excludes, when not inclusive).
    pub rules: Vec<String>,
    pub inclusive: bool,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fixture {
    FactData(FactData),
    VerifyFact(VerifyFact),
    VerifyRuleFired(VerifyRuleFired),
    ExecutionTrace(ExecutionTrace),
}

/// A fact inserted (or modified) before rules fire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactData {
    /// Declared type of the fact, simple or qualified.
    pub type_name: String,
    /// Variable the fact is bound to.
    pub name: String,
    pub fields: Vec<FieldData>,
    pub is_modify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldData {
    pub name: String,
    pub value: String,
}

/// Expectations on a fact after rules fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyFact {
    /// A fact variable, or a type name when `any_fact_match` is set.
    pub name: String,
    pub fields: Vec<VerifyField>,
    pub any_fact_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyField {
    pub field_name: String,
    pub expected: String,
    pub operator: String,
}

impl Default for VerifyField {
    fn default() -> Self {
        VerifyField {
            field_name: String::new(),
            expected: String::new(),
            operator: "==".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyRuleFired {
    pub rule_name: String,
    pub expected_count: Option<u32>,
    pub expected_fire: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionTrace {
    pub max_rule_firings: u32,
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        ExecutionTrace {
            max_rule_firings: 100_000,
        }
    }
}

impl Scenario {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Scenario {
            name: name.into(),
            inclusive: true,
            ..Default::default()
        }
    }

    pub fn fact_data(&self) -> impl Iterator<Item = &FactData> {
        self.fixtures.iter().filter_map(|fixture| match fixture {
            Fixture::FactData(fact) => Some(fact),
            _ => None,
        })
    }

    /// Declared type of the fact bound to `variable`, as written.
    pub fn fact_type_of(&self, variable: &str) -> Option<&str> {
        self.fact_data()
            .find(|fact| fact.name == variable)
            .map(|fact| fact.type_name.as_str())
    }

    /// Reject structurally broken scenarios.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RuledexError::parse("Scenario has no name"));
        }
        for fixture in &self.fixtures {
            match fixture {
                Fixture::FactData(fact) if fact.type_name.trim().is_empty() => {
                    return Err(RuledexError::parse(format!(
                        "Fact '{}' in scenario '{}' has no type",
                        fact.name, self.name
                    )));
                }
                Fixture::VerifyFact(verify) if verify.name.trim().is_empty() => {
                    return Err(RuledexError::parse(format!(
                        "Fact verification in scenario '{}' names no fact",
                        self.name
                    )));
                }
                Fixture::VerifyRuleFired(verify) if verify.rule_name.trim().is_empty() => {
                    return Err(RuledexError::parse(format!(
                        "Rule verification in scenario '{}' names no rule",
                        self.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
