//! Load the ledger table from a JSON file or the built-in copy, and resolve it.

use crate::config::resolved::{EntityScope, LedgerScope, ResolvedLedger, ResolvedModel};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use crate::settings::Settings;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_LEDGERS: &str = include_str!("../../config/ledgers.json");

/// Build resolved model from full config (validates first).
pub fn resolve(config: &FullConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let mut ledgers = Vec::with_capacity(config.ledgers.len());
    let mut ledger_by_path = HashMap::new();
    for ledger in &config.ledgers {
        let scope = match &ledger.entity {
            Some(entity) => LedgerScope::Entity(EntityScope {
                table_name: format!("{}_entities", ledger.id),
                validation: entity.validation.clone(),
            }),
            None => LedgerScope::Global,
        };
        let resolved = ResolvedLedger {
            id: ledger.id.clone(),
            path_segment: ledger.path_segment.clone(),
            credit: ledger.credit.clone(),
            debit: ledger.debit.clone(),
            quantity_label: ledger.quantity_label.clone(),
            previous_label: format!("previous_{}", ledger.quantity_label),
            outcomes: ledger.outcomes.clone(),
            movements_table: format!("{}_movements", ledger.id),
            scope,
            comment: ledger.comment.clone(),
        };
        ledger_by_path.insert(resolved.path_segment.clone(), resolved.clone());
        ledgers.push(resolved);
    }

    Ok(ResolvedModel {
        ledgers,
        ledger_by_path,
    })
}

/// Parse a ledger table: a JSON array of ledger entries.
pub fn parse(json: &str) -> Result<FullConfig, ConfigError> {
    let ledgers: Vec<LedgerConfig> = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(FullConfig { ledgers })
}

/// The ledger table shipped with the crate (`config/ledgers.json`).
pub fn builtin() -> Result<FullConfig, ConfigError> {
    parse(BUILTIN_LEDGERS)
}

pub async fn load_from_path(path: &Path) -> Result<FullConfig, ConfigError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse(&json)
}

/// Load the table named by settings, falling back to the built-in one.
pub async fn load(settings: &Settings) -> Result<FullConfig, ConfigError> {
    match &settings.ledger_config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading ledger table");
            load_from_path(path).await
        }
        None => builtin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_table() {
        let model = resolve(&builtin().unwrap()).unwrap();
        assert_eq!(model.ledgers.len(), 3);

        let alcancia = model.ledger_by_path("alcancia").unwrap();
        assert!(!alcancia.is_scoped());
        assert_eq!(alcancia.movements_table, "alcancia_movements");
        assert_eq!(alcancia.previous_label, "previous_balance");
        assert_eq!(alcancia.outcomes.settled, "settled");

        let cars = model.ledger_by_path("registro_carro").unwrap();
        assert_eq!(cars.entity_scope().unwrap().table_name, "registro_carro_entities");
        assert_eq!(cars.previous_label, "previous_inventory");
        assert_eq!(cars.outcomes.rejected, "rechazado");
    }

    #[test]
    fn defaults_apply_to_sparse_entries() {
        let config = parse(r#"[{"id": "tips", "path_segment": "tips", "credit": "in", "debit": "out"}]"#).unwrap();
        let model = resolve(&config).unwrap();
        let tips = model.ledger_by_path("tips").unwrap();
        assert_eq!(tips.quantity_label, "balance");
        assert_eq!(tips.outcomes, OutcomeLabels::default());
        assert_eq!(tips.kind("in"), Some(crate::service::MovementKind::Credit));
        assert_eq!(tips.kind("out"), Some(crate::service::MovementKind::Debit));
        assert_eq!(tips.kind("sideways"), None);
    }

    #[test]
    fn entity_path_override_is_refused() {
        let json = r#"[{"id": "cities", "path_segment": "cities", "credit": "in", "debit": "out",
            "entity": {"path_segment": "towns", "validation": {}}}]"#;
        assert!(matches!(parse(json), Err(ConfigError::Load(_))));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(parse("{not json"), Err(ConfigError::Load(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_from_path(Path::new("/nonexistent/ledgers.json")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
