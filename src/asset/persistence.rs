//! Marshalling between persisted asset text and the in-memory models.
//!
//! The persisted form is JSON. Unmarshalling validates the model, so
//! indexers only ever see well-formed assets.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::asset::{Asset, AssetType};
use crate::error::{Result, RuledexError};
use crate::model::{RuleModel, Scenario, ScoreCardModel};

pub fn unmarshal(asset_type: AssetType, content: &str) -> Result<Asset> {
    match asset_type {
        AssetType::ScoreCard => unmarshal_scorecard(content).map(Asset::ScoreCard),
        AssetType::TestScenario => unmarshal_scenario(content).map(Asset::TestScenario),
        AssetType::GuidedRule => unmarshal_rule(content).map(Asset::GuidedRule),
    }
}

pub fn marshal(asset: &Asset) -> Result<String> {
    match asset {
        Asset::ScoreCard(model) => marshal_model(model),
        Asset::TestScenario(model) => marshal_model(model),
        Asset::GuidedRule(model) => marshal_model(model),
    }
}

pub fn unmarshal_scorecard(content: &str) -> Result<ScoreCardModel> {
    let model: ScoreCardModel = parse(AssetType::ScoreCard, content)?;
    model.validate()?;
    Ok(model)
}

pub fn unmarshal_scenario(content: &str) -> Result<Scenario> {
    let model: Scenario = parse(AssetType::TestScenario, content)?;
    model.validate()?;
    Ok(model)
}

pub fn unmarshal_rule(content: &str) -> Result<RuleModel> {
    let model: RuleModel = parse(AssetType::GuidedRule, content)?;
    model.validate()?;
    Ok(model)
}

pub fn marshal_model<T: Serialize>(model: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

fn parse<T: DeserializeOwned>(asset_type: AssetType, content: &str) -> Result<T> {
    if content.trim().is_empty() {
        return Err(RuledexError::parse(format!("Empty {asset_type} content")));
    }
    serde_json::from_str(content).map_err(|e| {
        RuledexError::parse(format!(
            "Invalid {asset_type} at line {} column {}: {e}",
            e.line(),
            e.column()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Characteristic;

    #[test]
    fn test_scorecard_round_trip() {
        let mut model = ScoreCardModel::new("sc1");
        model.package_name = "org.mortgages".to_string();
        model.imports.add("org.mortgages.Applicant");
        model.fact_name = "Applicant".to_string();
        model.field_name = "score".to_string();
        model.characteristics.push(Characteristic {
            name: "age".to_string(),
            fact: "Applicant".to_string(),
            field: "age".to_string(),
            data_type: "Integer".to_string(),
            ..Default::default()
        });

        let asset = Asset::ScoreCard(model);
        let text = marshal(&asset).unwrap();
        assert_eq!(unmarshal(AssetType::ScoreCard, &text).unwrap(), asset);
    }

    #[test]
    fn test_malformed_content_is_a_parse_error() {
        assert!(matches!(
            unmarshal(AssetType::TestScenario, "{ not json"),
            Err(RuledexError::Parse(_))
        ));
        assert!(matches!(
            unmarshal(AssetType::GuidedRule, "   "),
            Err(RuledexError::Parse(_))
        ));
        // Valid JSON, invalid model
        assert!(matches!(
            unmarshal(AssetType::ScoreCard, "{\"name\": \"\"}"),
            Err(RuledexError::Parse(_))
        ));
    }
}
