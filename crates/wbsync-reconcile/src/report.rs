//! Batch outcome reporting
//!
//! Per-record outcomes with aggregate counts. Serializable for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::{Action, ActionKind};
use crate::model::{FinancialRecord, ItemId, ProjectId, WbsNumber};
use crate::pipeline::PipelineStage;

/// Final state of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The mutation was applied.
    Succeeded { item_id: ItemId, kind: ActionKind },
    /// Dry run: the action that would have been submitted.
    Planned { action: Action },
    /// Not reconciled: no mapping configured, or the batch was cancelled.
    Skipped { reason: String },
    /// Reconciliation failed at `stage`.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<PipelineStage>,
        error: String,
    },
}

impl RecordOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(stage: Option<PipelineStage>, error: impl ToString) -> Self {
        Self::Failed {
            stage,
            error: error.to_string(),
        }
    }
}

/// Outcome of one record in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    /// Position in the input (0-based).
    pub index: usize,
    pub project_id: ProjectId,
    pub wbs: WbsNumber,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl RecordReport {
    pub fn new(index: usize, record: &FinancialRecord, outcome: RecordOutcome) -> Self {
        Self {
            index,
            project_id: record.project_id.clone(),
            wbs: record.wbs.clone(),
            outcome,
        }
    }
}

/// Summary of a completed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Correlation id, also attached to log lines.
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub total: usize,
    pub succeeded: usize,
    pub created: usize,
    pub updated: usize,
    pub planned: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Whether cancellation was requested before every record started.
    pub interrupted: bool,
    pub duration_ms: u64,
    /// Per-record results, ordered by input index.
    pub items: Vec<RecordReport>,
}

impl BatchReport {
    pub fn new(total: usize, dry_run: bool) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            dry_run,
            total,
            succeeded: 0,
            created: 0,
            updated: 0,
            planned: 0,
            skipped: 0,
            failed: 0,
            interrupted: false,
            duration_ms: 0,
            items: Vec::with_capacity(total),
        }
    }

    /// Record an outcome and update the counts.
    pub fn push(&mut self, report: RecordReport) {
        match &report.outcome {
            RecordOutcome::Succeeded { kind, .. } => {
                self.succeeded += 1;
                match kind {
                    ActionKind::Create => self.created += 1,
                    ActionKind::Update => self.updated += 1,
                }
            }
            RecordOutcome::Planned { .. } => self.planned += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(report);
    }

    /// Sort items by input index and stamp the duration.
    pub fn finish(&mut self, duration_ms: u64) {
        self.items.sort_by_key(|item| item.index);
        self.duration_ms = duration_ms;
    }

    /// Every record reached its intended end state.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.skipped == 0 && !self.interrupted
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Reports for failed records.
    pub fn failures(&self) -> impl Iterator<Item = &RecordReport> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, RecordOutcome::Failed { .. }))
    }
}
