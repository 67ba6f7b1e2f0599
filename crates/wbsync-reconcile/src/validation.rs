//! Record validation, run before a record enters the pipeline.

use crate::config::{FieldSource, ReconcileConfig};
use crate::error::{ReconcileError, ReconcileResult};
use crate::model::FinancialRecord;

/// Reject records that cannot be reconciled under `config`.
///
/// Blank identifiers or name, and missing amounts for required bindings,
/// are validation failures. Optional amounts may be absent.
pub fn validate_record(record: &FinancialRecord, config: &ReconcileConfig) -> ReconcileResult<()> {
    if record.project_id.is_blank() {
        return Err(ReconcileError::Validation("project_id is blank".into()));
    }
    if record.wbs.is_blank() {
        return Err(ReconcileError::Validation("wbs is blank".into()));
    }
    if record.name.trim().is_empty() {
        return Err(ReconcileError::Validation("name is blank".into()));
    }

    let missing: Vec<&str> = config
        .columns
        .iter()
        .filter(|b| b.required)
        .filter_map(|b| match &b.source {
            FieldSource::Amount(field) if record.amount(field).is_none() => Some(field.as_str()),
            _ => None,
        })
        .collect();

    if !missing.is_empty() {
        return Err(ReconcileError::Validation(format!(
            "missing required amount(s): {}",
            missing.join(", ")
        )));
    }

    Ok(())
}
