//! Substrate document schema.
//!
//! Field presence is checked in [`crate::database`], so everything a
//! document may omit or get wrong is optional here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubstrateDocument {
    #[serde(default)]
    pub substrates: Vec<SubstrateDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubstrateDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<Vec<ParameterDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phys: Option<Vec<ParameterDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinetic: Option<Vec<ParameterDef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostDef {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDef {
    pub symbol: String,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}
