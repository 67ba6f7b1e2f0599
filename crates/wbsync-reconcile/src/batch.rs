//! Batch reconciliation runner
//!
//! Validates every record, then runs the pipeline for the valid ones on
//! spawned tasks bounded by a semaphore. Transport failures re-run the whole
//! record pipeline under the configured [`RetryPolicy`]. Setting the shutdown
//! flag lets in-flight records finish and skips the rest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use wbsync_monday::api::BoardApi;
use wbsync_monday::retry::{RetryExhausted, RetryPolicy};

use crate::config::{ConfigError, ReconcileConfig};
use crate::error::ReconcileError;
use crate::model::FinancialRecord;
use crate::pipeline::{Pipeline, PipelineResult, PipelineStage, StageFailure};
use crate::report::{BatchReport, RecordOutcome, RecordReport};
use crate::validation::validate_record;

const CANCELLED_REASON: &str = "cancelled";

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Resolve, locate and decide, but submit no mutations.
    pub dry_run: bool,
}

/// Runs [`Pipeline`]s for a batch of records.
pub struct BatchReconciler {
    pipeline: Arc<Pipeline>,
    config: ReconcileConfig,
    options: BatchOptions,
    shutdown: Arc<AtomicBool>,
}

impl BatchReconciler {
    /// Validate `config` and wire the pipeline against `api`.
    pub fn new(api: Arc<dyn BoardApi>, config: ReconcileConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pipeline: Arc::new(Pipeline::new(api, &config)),
            config,
            options: BatchOptions::default(),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Share an external cancellation flag (e.g. set from a Ctrl+C handler).
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Request cancellation of the running batch.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Reconcile every record and report each outcome.
    pub async fn reconcile_batch(&self, records: Vec<FinancialRecord>) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport::new(records.len(), self.options.dry_run);
        let batch_id = report.batch_id;
        info!(
            batch_id = %batch_id,
            records = records.len(),
            concurrency = self.config.concurrency,
            dry_run = self.options.dry_run,
            "Starting reconciliation batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut in_flight: Vec<(usize, FinancialRecord, JoinHandle<RecordOutcome>)> = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            if let Err(e) = validate_record(&record, &self.config) {
                warn!(
                    batch_id = %batch_id,
                    index,
                    project_id = %record.project_id,
                    wbs = %record.wbs,
                    error = %e,
                    "Record rejected by validation"
                );
                report.push(RecordReport::new(
                    index,
                    &record,
                    RecordOutcome::failed(Some(PipelineStage::Validating), e),
                ));
                continue;
            }

            if self.is_shutdown() {
                report.interrupted = true;
                report.push(RecordReport::new(index, &record, RecordOutcome::skipped(CANCELLED_REASON)));
                continue;
            }

            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                report.push(RecordReport::new(index, &record, RecordOutcome::skipped(CANCELLED_REASON)));
                continue;
            };

            // The flag may have been set while waiting for a permit.
            if self.is_shutdown() {
                drop(permit);
                report.interrupted = true;
                report.push(RecordReport::new(index, &record, RecordOutcome::skipped(CANCELLED_REASON)));
                continue;
            }

            let pipeline = Arc::clone(&self.pipeline);
            let retry = self.config.retry.clone();
            let dry_run = self.options.dry_run;
            let task_record = record.clone();
            let shutdown = Arc::clone(&self.shutdown);
            let handle = tokio::spawn(async move {
                let _permit = permit;
                run_record(&pipeline, &retry, &task_record, dry_run, &shutdown).await
            });
            in_flight.push((index, record, handle));
        }

        for (index, record, handle) in in_flight {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => RecordOutcome::failed(None, ReconcileError::Aborted(e.to_string())),
            };
            log_outcome(batch_id, index, &record, &outcome);
            report.push(RecordReport::new(index, &record, outcome));
        }

        report.finish(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));
        info!(
            batch_id = %batch_id,
            total = report.total,
            succeeded = report.succeeded,
            created = report.created,
            updated = report.updated,
            planned = report.planned,
            skipped = report.skipped,
            failed = report.failed,
            interrupted = report.interrupted,
            duration_ms = report.duration_ms,
            "Reconciliation batch finished"
        );
        report
    }
}

/// Run one record's pipeline, re-running it on transport failures until
/// the batch is shut down.
async fn run_record(
    pipeline: &Pipeline,
    retry: &RetryPolicy,
    record: &FinancialRecord,
    dry_run: bool,
    shutdown: &AtomicBool,
) -> RecordOutcome {
    let result = retry
        .execute_while(
            "reconcile_record",
            || !shutdown.load(Ordering::Relaxed),
            move || pipeline.run(record, dry_run),
        )
        .await;

    match result {
        Ok(PipelineResult::Applied { item_id, kind }) => RecordOutcome::Succeeded { item_id, kind },
        Ok(PipelineResult::Planned(action)) => RecordOutcome::Planned { action },
        Err(RetryExhausted {
            last_error: StageFailure { error, .. },
            ..
        }) if error.is_skip() => RecordOutcome::skipped(error.to_string()),
        Err(RetryExhausted {
            attempts,
            last_error: StageFailure { stage, error },
        }) => {
            let message = if attempts > 1 {
                format!("{error} (after {attempts} attempts)")
            } else {
                error.to_string()
            };
            RecordOutcome::failed(Some(stage), message)
        }
    }
}

fn log_outcome(batch_id: uuid::Uuid, index: usize, record: &FinancialRecord, outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Succeeded { item_id, kind } => info!(
            batch_id = %batch_id,
            index,
            project_id = %record.project_id,
            wbs = %record.wbs,
            item_id = %item_id,
            kind = %kind,
            "Record reconciled"
        ),
        RecordOutcome::Planned { action } => info!(
            batch_id = %batch_id,
            index,
            project_id = %record.project_id,
            wbs = %record.wbs,
            kind = %action.kind(),
            "Record planned (dry run)"
        ),
        RecordOutcome::Skipped { reason } => warn!(
            batch_id = %batch_id,
            index,
            project_id = %record.project_id,
            wbs = %record.wbs,
            reason = %reason,
            "Record skipped"
        ),
        RecordOutcome::Failed { stage, error } => error!(
            batch_id = %batch_id,
            index,
            project_id = %record.project_id,
            wbs = %record.wbs,
            stage = ?stage,
            error = %error,
            "Record failed"
        ),
    }
}
