//! Per-record reconciliation pipeline.
//!
//! `Resolving → Locating → Deciding → Executing`. The pipeline never retries
//! on its own; a failure is returned tagged with the stage it happened in and
//! the caller decides whether to run the whole pipeline again.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use wbsync_monday::api::BoardApi;
use wbsync_monday::retry::Retryable;

use crate::config::ReconcileConfig;
use crate::engine::{Action, ActionKind, ReconciliationEngine};
use crate::error::ReconcileError;
use crate::executor::MutationExecutor;
use crate::locator::ItemLocator;
use crate::locks::KeyLocks;
use crate::model::{FinancialRecord, ItemId};
use crate::resolver::BoardMappingResolver;

/// Stage a record is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validating,
    Resolving,
    Locating,
    Deciding,
    Executing,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Resolving => "resolving",
            Self::Locating => "locating",
            Self::Deciding => "deciding",
            Self::Executing => "executing",
        };
        f.write_str(name)
    }
}

/// Successful end of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Applied { item_id: ItemId, kind: ActionKind },
    Planned(Action),
}

/// A pipeline failure and the stage that produced it.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: ReconcileError,
}

impl StageFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(ReconcileError) -> Self {
        move |error| Self { stage, error }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

impl Retryable for StageFailure {
    fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }

    fn retry_after_secs(&self) -> Option<u64> {
        Retryable::retry_after_secs(&self.error)
    }
}

/// The four components wired together, plus the key lock registry.
pub struct Pipeline {
    resolver: BoardMappingResolver,
    locator: ItemLocator,
    engine: ReconciliationEngine,
    executor: MutationExecutor,
    locks: KeyLocks,
}

impl Pipeline {
    pub fn new(api: Arc<dyn BoardApi>, config: &ReconcileConfig) -> Self {
        let timeout = config.call_timeout();
        Self {
            resolver: BoardMappingResolver::new(api.clone(), config.mapping.clone(), timeout),
            locator: ItemLocator::new(api.clone(), config.item_key_column.clone(), timeout),
            engine: ReconciliationEngine::new(config.columns.clone()),
            executor: MutationExecutor::new(api, timeout),
            locks: KeyLocks::new(),
        }
    }

    /// Lock registry shared by every run of this pipeline.
    #[must_use]
    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    /// Run one record through the pipeline.
    ///
    /// The (board, WBS) lock is held from Locating through Executing, so a
    /// concurrent run for the same key observes this run's mutation.
    /// With `dry_run` the decided action is returned instead of executed.
    pub async fn run(
        &self,
        record: &FinancialRecord,
        dry_run: bool,
    ) -> Result<PipelineResult, StageFailure> {
        debug!(project_id = %record.project_id, wbs = %record.wbs, stage = %PipelineStage::Resolving, "Pipeline stage");
        let mapping = self
            .resolver
            .resolve(&record.project_id)
            .await
            .map_err(StageFailure::at(PipelineStage::Resolving))?;

        let _key_guard = self
            .locks
            .acquire(&mapping.board_id, record.wbs.as_str())
            .await;

        debug!(board_id = %mapping.board_id, wbs = %record.wbs, stage = %PipelineStage::Locating, "Pipeline stage");
        let existing = self
            .locator
            .find(&mapping.board_id, record.wbs.as_str())
            .await
            .map_err(StageFailure::at(PipelineStage::Locating))?;

        let action = self
            .engine
            .reconcile(&mapping.board_id, record, existing.as_ref())
            .map_err(StageFailure::at(PipelineStage::Deciding))?;

        info!(
            project_id = %record.project_id,
            wbs = %record.wbs,
            board_id = %mapping.board_id,
            kind = %action.kind(),
            dry_run,
            "Reconciliation decided"
        );

        if dry_run {
            return Ok(PipelineResult::Planned(action));
        }

        let item_id = self
            .executor
            .execute(&action)
            .await
            .map_err(StageFailure::at(PipelineStage::Executing))?;

        Ok(PipelineResult::Applied {
            item_id,
            kind: action.kind(),
        })
    }
}
