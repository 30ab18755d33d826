//! Raw ledger table types matching the JSON config (`config/ledgers.json`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    #[serde(default = "default_settled")]
    pub settled: String,
    #[serde(default = "default_rejected")]
    pub rejected: String,
}

impl Default for OutcomeLabels {
    fn default() -> Self {
        OutcomeLabels {
            settled: default_settled(),
            rejected: default_rejected(),
        }
    }
}

fn default_settled() -> String {
    "settled".into()
}

fn default_rejected() -> String {
    "rejected".into()
}

fn default_quantity_label() -> String {
    "balance".into()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

/// Present on ledgers whose accounts belong to an owning entity (a city, a car model).
/// Entities are always served under `/<ledger>/entities`; unknown keys are refused.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityScopeConfig {
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub id: String,
    pub path_segment: String,
    /// Kind name that increases the balance (e.g. "deposit", "entrada").
    pub credit: String,
    /// Kind name that decreases the balance (e.g. "withdraw", "salida").
    pub debit: String,
    #[serde(default = "default_quantity_label")]
    pub quantity_label: String,
    #[serde(default)]
    pub outcomes: OutcomeLabels,
    #[serde(default)]
    pub entity: Option<EntityScopeConfig>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// The whole ledger table.
#[derive(Clone, Debug, Default)]
pub struct FullConfig {
    pub ledgers: Vec<LedgerConfig>,
}
