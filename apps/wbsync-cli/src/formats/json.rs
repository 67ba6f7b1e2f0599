//! JSON records format: an array of record objects.
//!
//! ```json
//! [{ "project_id": "123", "wbs": "2000000036.2", "name": "X",
//!    "amounts": { "budget": 111, "paid": "50" } }]
//! ```

use serde_json::Value;
use wbsync_reconcile::model::FinancialRecord;

use super::{RecordSet, RejectedRow};
use crate::error::{CliError, CliResult};

/// Parse a JSON array of records. Elements that do not deserialize are
/// rejected with their 1-based position.
pub fn parse_records(content: &str) -> CliResult<RecordSet> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(elements) = value else {
        return Err(CliError::Validation(
            "JSON records file must contain an array of records".to_string(),
        ));
    };

    let mut set = RecordSet::default();
    for (i, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<FinancialRecord>(element) {
            Ok(record) => set.records.push(record),
            Err(e) => set
                .rejected
                .push(RejectedRow::new(format!("record {}", i + 1), e.to_string())),
        }
    }
    Ok(set)
}
