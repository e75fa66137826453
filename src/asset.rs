//! Asset kinds and their persisted form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::model::{RuleModel, Scenario, ScoreCardModel};
use crate::term::AssetPath;

pub mod persistence;

/// The asset kinds that can be indexed, recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    ScoreCard,
    TestScenario,
    GuidedRule,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [
        AssetType::ScoreCard,
        AssetType::TestScenario,
        AssetType::GuidedRule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::ScoreCard => "scorecard",
            AssetType::TestScenario => "test_scenario",
            AssetType::GuidedRule => "guided_rule",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AssetType::ScoreCard => "scgd",
            AssetType::TestScenario => "scenario",
            AssetType::GuidedRule => "rdrl",
        }
    }

    pub fn from_path(path: &AssetPath) -> Option<AssetType> {
        let extension = path.extension()?;
        AssetType::ALL
            .into_iter()
            .find(|asset_type| asset_type.extension().eq_ignore_ascii_case(extension))
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = RuledexError;

    fn from_str(s: &str) -> Result<Self> {
        AssetType::ALL
            .into_iter()
            .find(|asset_type| asset_type.as_str() == s)
            .ok_or_else(|| RuledexError::invalid_argument(format!("Unknown asset type: {s}")))
    }
}

/// A parsed asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    ScoreCard(ScoreCardModel),
    TestScenario(Scenario),
    GuidedRule(RuleModel),
}

impl Asset {
    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::ScoreCard(_) => AssetType::ScoreCard,
            Asset::TestScenario(_) => AssetType::TestScenario,
            Asset::GuidedRule(_) => AssetType::GuidedRule,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Asset::ScoreCard(model) => &model.name,
            Asset::TestScenario(model) => &model.name,
            Asset::GuidedRule(model) => &model.name,
        }
    }

    pub fn package_name(&self) -> &str {
        match self {
            Asset::ScoreCard(model) => &model.package_name,
            Asset::TestScenario(model) => &model.package_name,
            Asset::GuidedRule(model) => &model.package_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_path() {
        let path = AssetPath::new("/p/src/main/resources/sc1.scgd").unwrap();
        assert_eq!(AssetType::from_path(&path), Some(AssetType::ScoreCard));

        let path = AssetPath::new("/p/t1.SCENARIO").unwrap();
        assert_eq!(AssetType::from_path(&path), Some(AssetType::TestScenario));

        assert_eq!(AssetType::from_path(&AssetPath::new("/p/readme.md").unwrap()), None);
        assert_eq!(AssetType::from_path(&AssetPath::new("/p/rdrl").unwrap()), None);
    }

    #[test]
    fn test_type_names() {
        for asset_type in AssetType::ALL {
            assert_eq!(asset_type.as_str().parse::<AssetType>().unwrap(), asset_type);
        }
        assert!("drl".parse::<AssetType>().is_err());
    }
}
