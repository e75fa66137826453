//! In-memory models of the rule assets that get indexed.
//!
//! Each asset kind has its own model ([`ScoreCardModel`], [`Scenario`],
//! [`RuleModel`]). The [`DataModel`] answers "what is the declared class of
//! field `f` on fact type `T`", which the indexers need for the
//! `FIELD_TYPE_FULLY_QUALIFIED_CLASS_NAME` terms.

pub mod data_model;
pub mod guided_rule;
pub mod imports;
pub mod scenario;
pub mod scorecard;

pub use data_model::{DataModel, DataModelBuilder, ModelField, qualify_data_type};
pub use guided_rule::{
    ActionFieldValue, ActionInsertFact, FactPattern, FieldConstraint, RuleAction, RuleAttribute,
    RuleModel,
};
pub use imports::{Import, Imports};
pub use scenario::{
    ExecutionTrace, FactData, FieldData, Fixture, Scenario, VerifyFact, VerifyField,
    VerifyRuleFired,
};
pub use scorecard::{Characteristic, CharacteristicAttribute, ScoreCardModel};
