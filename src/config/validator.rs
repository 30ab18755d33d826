//! Config validation: identifiers, uniqueness, and kind/outcome consistency.

use crate::config::FullConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

const IDENTIFIER: &str = "^[a-z][a-z0-9_]*$";
const PATH_SEGMENT: &str = "^[A-Za-z0-9_-]+$";
/// Keys the outcome and balance bodies already use next to the quantity label.
const RESERVED_LABELS: &[&str] = &["result", "movements", "entity_id"];

pub fn validate(config: &FullConfig) -> Result<(), ConfigError> {
    if config.ledgers.is_empty() {
        return Err(ConfigError::Validation("at least one ledger required".into()));
    }
    let ident = Regex::new(IDENTIFIER).map_err(|e| ConfigError::Load(e.to_string()))?;
    let segment = Regex::new(PATH_SEGMENT).map_err(|e| ConfigError::Load(e.to_string()))?;

    let mut ids = HashSet::new();
    let mut path_segments = HashSet::new();
    for ledger in &config.ledgers {
        if !ident.is_match(&ledger.id) {
            return Err(ConfigError::InvalidIdentifier {
                field: "id",
                value: ledger.id.clone(),
            });
        }
        if !ident.is_match(&ledger.quantity_label) {
            return Err(ConfigError::InvalidIdentifier {
                field: "quantity_label",
                value: ledger.quantity_label.clone(),
            });
        }
        if !segment.is_match(&ledger.path_segment) {
            return Err(ConfigError::InvalidIdentifier {
                field: "path_segment",
                value: ledger.path_segment.clone(),
            });
        }
        if ledger.path_segment == "ledgers" {
            return Err(ConfigError::Validation("path segment 'ledgers' is reserved".into()));
        }
        if !ids.insert(ledger.id.as_str()) {
            return Err(ConfigError::DuplicateId(ledger.id.clone()));
        }
        if !path_segments.insert(ledger.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(ledger.path_segment.clone()));
        }

        for kind in [&ledger.credit, &ledger.debit] {
            if kind.trim().is_empty() || kind.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "ledger {}: kind names must be non-empty path segments",
                    ledger.id
                )));
            }
        }
        if ledger.credit == ledger.debit {
            return Err(ConfigError::Validation(format!(
                "ledger {}: credit and debit must differ",
                ledger.id
            )));
        }
        if ledger.outcomes.settled.trim().is_empty()
            || ledger.outcomes.rejected.trim().is_empty()
            || ledger.outcomes.settled == ledger.outcomes.rejected
        {
            return Err(ConfigError::Validation(format!(
                "ledger {}: settled and rejected tags must be non-empty and distinct",
                ledger.id
            )));
        }
        if RESERVED_LABELS.contains(&ledger.quantity_label.as_str()) {
            return Err(ConfigError::Validation(format!(
                "ledger {}: quantity_label '{}' is a reserved response key",
                ledger.id, ledger.quantity_label
            )));
        }
        if let Some(entity) = &ledger.entity {
            for (field, rule) in &entity.validation {
                if matches!(field.as_str(), "id" | "created_at" | "updated_at") {
                    return Err(ConfigError::Validation(format!(
                        "ledger {}: entity field '{}' is reserved",
                        ledger.id, field
                    )));
                }
                if let Some(format) = &rule.format {
                    if !matches!(format.to_lowercase().as_str(), "integer" | "non_blank") {
                        return Err(ConfigError::Validation(format!(
                            "ledger {}: unknown format '{}' for {}",
                            ledger.id, format, field
                        )));
                    }
                }
                if let Some(pattern) = &rule.pattern {
                    Regex::new(pattern).map_err(|_| {
                        ConfigError::Validation(format!("ledger {}: invalid pattern for {}", ledger.id, field))
                    })?;
                }
            }
        }
    }
    Ok(())
}
