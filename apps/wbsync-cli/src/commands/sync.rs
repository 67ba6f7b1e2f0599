//! Sync command - Reconcile a records file onto boards

use clap::Args;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wbsync_monday::api::BoardApi;
use wbsync_monday::client::MondayClient;
use wbsync_monday::config::MondayConfig;
use wbsync_reconcile::batch::{BatchOptions, BatchReconciler};
use wbsync_reconcile::config::ReconcileConfig;
use wbsync_reconcile::report::BatchReport;

use crate::error::{CliError, CliResult};
use crate::formats::{load_records, RejectedRow};
use crate::output::{print_report, print_warning};

/// Arguments for the sync command
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Reconciliation config (YAML): board mapping and column bindings
    #[arg(long, short = 'c', env = "WBSYNC_CONFIG")]
    pub config: PathBuf,

    /// Records file (.csv or .json)
    #[arg(long, short = 'r')]
    pub records: PathBuf,

    /// Resolve and decide, but do not submit mutations
    #[arg(long)]
    pub dry_run: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Override the number of records processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Result of a sync run: the batch report plus rows rejected while loading.
#[derive(Debug)]
pub struct SyncOutcome {
    pub report: BatchReport,
    pub rejected: Vec<RejectedRow>,
}

impl SyncOutcome {
    /// Records that did not reach a successful end state.
    pub fn failed_count(&self) -> usize {
        self.report.failed + self.rejected.len()
    }

    pub fn total_count(&self) -> usize {
        self.report.total + self.rejected.len()
    }

    /// Map the outcome to the command result.
    pub fn into_result(self) -> CliResult<()> {
        if self.failed_count() > 0 || self.report.interrupted {
            Err(CliError::PartialFailure {
                failed: self.failed_count(),
                total: self.total_count(),
            })
        } else {
            Ok(())
        }
    }
}

/// Execute the sync command
pub async fn execute(args: SyncArgs) -> CliResult<()> {
    let monday = MondayConfig::from_env()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing records already in flight");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let outcome = run(&args, &monday, shutdown).await?;
    for row in &outcome.rejected {
        print_warning(&format!("Rejected {}", row));
    }
    print_report(&outcome.report, args.json)?;
    outcome.into_result()
}

/// Load config and records, then reconcile them against the API.
pub async fn run(
    args: &SyncArgs,
    monday: &MondayConfig,
    shutdown: Arc<AtomicBool>,
) -> CliResult<SyncOutcome> {
    let mut config = ReconcileConfig::load(&args.config)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    let set = load_records(&args.records)?;
    for row in &set.rejected {
        tracing::warn!(location = %row.location, error = %row.message, "Rejected record row");
    }

    let api: Arc<dyn BoardApi> = Arc::new(MondayClient::new(monday)?);
    let reconciler = BatchReconciler::new(api, config)?
        .with_options(BatchOptions {
            dry_run: args.dry_run,
        })
        .with_shutdown(shutdown);

    tracing::info!(
        records = set.records.len(),
        rejected = set.rejected.len(),
        dry_run = args.dry_run,
        "Starting sync"
    );
    let report = reconciler.reconcile_batch(set.records).await;

    Ok(SyncOutcome {
        report,
        rejected: set.rejected,
    })
}
