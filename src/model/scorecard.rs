//! Guided scorecard model.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::model::imports::Imports;

/// A scorecard: a score target field plus characteristics that contribute
/// partial scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreCardModel {
    pub name: String,
    pub package_name: String,
    pub imports: Imports,
    /// Fact type holding the score.
    pub fact_name: String,
    /// Field on `fact_name` receiving the score.
    pub field_name: String,
    pub reason_code_field: String,
    pub use_reason_codes: bool,
    pub initial_score: f64,
    pub characteristics: Vec<Characteristic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characteristic {
    pub name: String,
    pub fact: String,
    pub field: String,
    /// Short or fully-qualified data type of `field`.
    pub data_type: String,
    pub baseline_score: f64,
    pub reason_code: String,
    pub attributes: Vec<CharacteristicAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacteristicAttribute {
    pub operator: String,
    pub value: String,
    pub partial_score: f64,
    pub reason_code: String,
}

impl ScoreCardModel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ScoreCardModel {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject structurally broken scorecards.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RuledexError::parse("Scorecard has no name"));
        }
        if self.fact_name.trim().is_empty() != self.field_name.trim().is_empty() {
            return Err(RuledexError::parse(format!(
                "Scorecard '{}' must name both the score fact and field, or neither",
                self.name
            )));
        }
        for characteristic in &self.characteristics {
            if characteristic.fact.trim().is_empty() != characteristic.field.trim().is_empty() {
                return Err(RuledexError::parse(format!(
                    "Characteristic '{}' must name both a fact and a field, or neither",
                    characteristic.name
                )));
            }
        }
        Ok(())
    }
}
