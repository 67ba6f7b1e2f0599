//! Shared records and configuration for reconciliation tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use wbsync_monday::retry::RetryPolicy;
use wbsync_reconcile::config::{ColumnBinding, FieldSource, MappingSource, ReconcileConfig};
use wbsync_reconcile::model::{BoardId, FinancialRecord, ProjectId};

pub const TARGET_BOARD: u64 = 1_234_567_890;
pub const MAPPING_BOARD: u64 = 1_111_111_111;
pub const EXISTING_ITEM: u64 = 7_388_693_067;
pub const SCENARIO_PAYLOAD: &str =
    r#"{"numbers9__1":111,"numeric5__1":5,"numeric8__1":50,"wbs__1":"2000000036.2"}"#;

pub fn target_board() -> BoardId {
    BoardId::from(TARGET_BOARD)
}

pub fn mapping_board() -> BoardId {
    BoardId::from(MAPPING_BOARD)
}

pub fn scenario_columns() -> Vec<ColumnBinding> {
    vec![
        ColumnBinding::new(FieldSource::Wbs, "wbs__1").required(),
        ColumnBinding::new(FieldSource::Amount("budget".into()), "numbers9__1"),
        ColumnBinding::new(FieldSource::Amount("paid".into()), "numeric8__1"),
        ColumnBinding::new(FieldSource::Amount("remaining".into()), "numeric5__1"),
    ]
}

/// Static mapping of project "123" to the target board.
pub fn static_config() -> ReconcileConfig {
    let mapping = MappingSource::Static {
        boards: BTreeMap::from([(ProjectId::new("123"), target_board())]),
    };
    fast(ReconcileConfig::new(mapping, "wbs__1", scenario_columns()))
}

/// Mapping board lookup: project id in `text__project`, board in `text__board`.
pub fn board_mapping_config() -> ReconcileConfig {
    let mapping = MappingSource::Board {
        board_id: mapping_board(),
        project_column: "text__project".into(),
        target_board_column: "text__board".into(),
    };
    fast(ReconcileConfig::new(mapping, "wbs__1", scenario_columns()))
}

fn fast(mut config: ReconcileConfig) -> ReconcileConfig {
    config.retry = RetryPolicy::new(2, 0);
    config.call_timeout_secs = 5;
    config
}

pub fn scenario_record() -> FinancialRecord {
    FinancialRecord::new("123", "2000000036.2", "X")
        .with_amount("budget", Decimal::from(111))
        .with_amount("paid", Decimal::from(50))
        .with_amount("remaining", Decimal::from(5))
}

pub fn record(project_id: &str, wbs: &str) -> FinancialRecord {
    FinancialRecord::new(project_id, wbs, format!("WBS {wbs}"))
        .with_amount("budget", Decimal::from(100))
}
