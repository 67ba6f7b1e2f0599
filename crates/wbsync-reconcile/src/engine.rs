//! Create-or-update decision and payload construction.
//!
//! The engine is pure: it performs no I/O and the same record, board and
//! existing item always produce the same [`Action`] with a byte-identical
//! encoded payload.

use serde::Serialize;
use std::fmt;

use wbsync_monday::column::{ColumnValue, ColumnValuePayload};

use crate::config::{ColumnBinding, FieldSource};
use crate::error::{ReconcileError, ReconcileResult};
use crate::model::{BoardId, BoardItem, FinancialRecord, ItemId};

/// The mutation decided for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Create {
        board_id: BoardId,
        name: String,
        column_values: ColumnValuePayload,
    },
    Update {
        board_id: BoardId,
        item_id: ItemId,
        column_values: ColumnValuePayload,
    },
}

/// Discriminant of [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create { .. } => ActionKind::Create,
            Self::Update { .. } => ActionKind::Update,
        }
    }

    #[must_use]
    pub fn board_id(&self) -> &BoardId {
        match self {
            Self::Create { board_id, .. } | Self::Update { board_id, .. } => board_id,
        }
    }

    #[must_use]
    pub fn column_values(&self) -> &ColumnValuePayload {
        match self {
            Self::Create { column_values, .. } | Self::Update { column_values, .. } => {
                column_values
            }
        }
    }
}

/// Builds [`Action`]s from records using a static column binding table.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    columns: Vec<ColumnBinding>,
}

impl ReconciliationEngine {
    pub fn new(columns: Vec<ColumnBinding>) -> Self {
        Self { columns }
    }

    /// Decide the action for `record` on `board_id`.
    ///
    /// No existing item yields [`Action::Create`] named after the record;
    /// an existing item yields [`Action::Update`] addressed to it.
    pub fn reconcile(
        &self,
        board_id: &BoardId,
        record: &FinancialRecord,
        existing: Option<&BoardItem>,
    ) -> ReconcileResult<Action> {
        let column_values = self.build_payload(record)?;
        Ok(match existing {
            None => Action::Create {
                board_id: board_id.clone(),
                name: record.name.clone(),
                column_values,
            },
            Some(item) => Action::Update {
                board_id: board_id.clone(),
                item_id: item.id.clone(),
                column_values,
            },
        })
    }

    /// Column payload for `record`. Absent optional amounts are omitted.
    pub fn build_payload(&self, record: &FinancialRecord) -> ReconcileResult<ColumnValuePayload> {
        let mut payload = ColumnValuePayload::new();
        for binding in &self.columns {
            let value = match &binding.source {
                FieldSource::ProjectId => Some(ColumnValue::from(record.project_id.as_str())),
                FieldSource::Wbs => Some(ColumnValue::from(record.wbs.as_str())),
                FieldSource::Name => Some(ColumnValue::from(record.name.as_str())),
                FieldSource::Amount(field) => record.amount(field).map(ColumnValue::Number),
            };
            match value {
                Some(value) => payload.insert(binding.column_id.as_str(), value),
                None if binding.required => {
                    return Err(ReconcileError::Validation(format!(
                        "required field '{}' missing for column '{}'",
                        binding.source, binding.column_id
                    )));
                }
                None => {}
            }
        }
        Ok(payload)
    }
}
