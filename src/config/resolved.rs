//! Resolved ledger model: config validated and flattened for runtime use.

use crate::config::{OutcomeLabels, ValidationRule};
use crate::service::MovementKind;
use std::collections::HashMap;

/// Owning-entity table and field rules of a scoped ledger.
#[derive(Clone, Debug)]
pub struct EntityScope {
    pub table_name: String,
    pub validation: HashMap<String, ValidationRule>,
}

#[derive(Clone, Debug)]
pub enum LedgerScope {
    /// One implicit account holds every movement.
    Global,
    /// One account per owning entity; sums are filtered by entity id.
    Entity(EntityScope),
}

#[derive(Clone, Debug)]
pub struct ResolvedLedger {
    pub id: String,
    pub path_segment: String,
    pub credit: String,
    pub debit: String,
    /// Response key for the balance after the movement (e.g. "inventory").
    pub quantity_label: String,
    /// Response key for the balance before the movement (e.g. "previous_inventory").
    pub previous_label: String,
    pub outcomes: OutcomeLabels,
    pub movements_table: String,
    pub scope: LedgerScope,
    pub comment: Option<String>,
}

impl ResolvedLedger {
    /// Map a path kind name to its direction.
    pub fn kind(&self, name: &str) -> Option<MovementKind> {
        if name == self.credit {
            Some(MovementKind::Credit)
        } else if name == self.debit {
            Some(MovementKind::Debit)
        } else {
            None
        }
    }

    pub fn kind_name(&self, kind: MovementKind) -> &str {
        match kind {
            MovementKind::Credit => &self.credit,
            MovementKind::Debit => &self.debit,
        }
    }

    pub fn entity_scope(&self) -> Option<&EntityScope> {
        match &self.scope {
            LedgerScope::Entity(scope) => Some(scope),
            LedgerScope::Global => None,
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.entity_scope().is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub ledgers: Vec<ResolvedLedger>,
    pub ledger_by_path: HashMap<String, ResolvedLedger>,
}

impl ResolvedModel {
    pub fn ledger_by_path(&self, path: &str) -> Option<&ResolvedLedger> {
        self.ledger_by_path.get(path)
    }
}
