//! Reconciliation of financial WBS records onto board items.
//!
//! Each record flows through [`resolver::BoardMappingResolver`] (project →
//! board), [`locator::ItemLocator`] (board + WBS → existing item),
//! [`engine::ReconciliationEngine`] (create or update) and
//! [`executor::MutationExecutor`] (one mutation call).
//! [`batch::BatchReconciler`] runs many records concurrently and collects a
//! [`report::BatchReport`].

mod call;

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod locator;
pub mod locks;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod validation;

pub use batch::{BatchOptions, BatchReconciler};
pub use config::{ColumnBinding, ConfigError, FieldSource, MappingSource, ReconcileConfig};
pub use engine::{Action, ActionKind, ReconciliationEngine};
pub use error::{ReconcileError, ReconcileResult};
pub use model::{BoardId, BoardItem, BoardMapping, FinancialRecord, ItemId, ProjectId, WbsNumber};
pub use report::{BatchReport, RecordOutcome, RecordReport};
