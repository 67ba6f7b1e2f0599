//! Batch report rendering: a per-record table plus summary, or JSON.

use wbsync_reconcile::engine::Action;
use wbsync_reconcile::report::{BatchReport, RecordOutcome, RecordReport};

use super::printer::{print_header, print_key_value, print_success, print_warning};
use crate::error::CliResult;

/// Truncate a string for table display, handling Unicode safely.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Status label and detail column for one record.
pub(crate) fn describe(outcome: &RecordOutcome) -> (&'static str, String) {
    match outcome {
        RecordOutcome::Succeeded { item_id, kind } => ("ok", format!("{} item {}", kind, item_id)),
        RecordOutcome::Planned { action } => ("planned", describe_action(action)),
        RecordOutcome::Skipped { reason } => ("skipped", reason.clone()),
        RecordOutcome::Failed { stage, error } => match stage {
            Some(stage) => ("failed", format!("{}: {}", stage, error)),
            None => ("failed", error.clone()),
        },
    }
}

fn describe_action(action: &Action) -> String {
    match action {
        Action::Create {
            board_id, name, ..
        } => format!("create '{}' on board {}", name, board_id),
        Action::Update {
            board_id, item_id, ..
        } => format!("update item {} on board {}", item_id, board_id),
    }
}

fn print_row(item: &RecordReport) {
    let (status, detail) = describe(&item.outcome);
    println!(
        "{:<5} {:<12} {:<20} {:<8} {}",
        item.index + 1,
        truncate(item.project_id.as_str(), 12),
        truncate(item.wbs.as_str(), 20),
        status,
        truncate(&detail, 70)
    );
}

/// Print the report as a table and summary, or as pretty JSON.
pub fn print_report(report: &BatchReport, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let title = if report.dry_run {
        "Reconciliation plan (dry run)"
    } else {
        "Reconciliation report"
    };
    print_header(title);

    if !report.items.is_empty() {
        println!(
            "{:<5} {:<12} {:<20} {:<8} DETAIL",
            "#", "PROJECT", "WBS", "STATUS"
        );
        for item in &report.items {
            print_row(item);
        }
        println!();
    }

    print_key_value("Batch", &report.batch_id.to_string());
    print_key_value("Records", &report.total.to_string());
    if report.dry_run {
        print_key_value("Planned", &report.planned.to_string());
    } else {
        print_key_value(
            "Succeeded",
            &format!(
                "{} ({} created, {} updated)",
                report.succeeded, report.created, report.updated
            ),
        );
    }
    print_key_value("Skipped", &report.skipped.to_string());
    print_key_value("Failed", &report.failed.to_string());
    print_key_value("Duration", &format!("{} ms", report.duration_ms));
    println!();

    if report.interrupted {
        print_warning("Batch was interrupted; records not started were skipped.");
    }
    if report.all_succeeded() {
        print_success("All records reconciled.");
    }
    Ok(())
}
