//! Reconciliation error taxonomy
//!
//! Every error is scoped to a single record. `NotFound` is a skip,
//! `Transport` is retried by the batch runner, everything else fails the
//! record without touching the board.

use thiserror::Error;
use wbsync_monday::error::MondayClientError;
use wbsync_monday::retry::Retryable;

use crate::model::{BoardId, ItemId, ProjectId};

/// Result alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No board is configured for the project.
    #[error("no board mapping configured for project '{project_id}'")]
    NotFound { project_id: ProjectId },

    /// The mapping table has more than one row for the project.
    #[error("project '{project_id}' matches {count} mapping rows")]
    AmbiguousMapping { project_id: ProjectId, count: usize },

    /// The mapping row exists but names no usable board.
    #[error("mapping for project '{project_id}' has no usable board id: {detail}")]
    InvalidMapping {
        project_id: ProjectId,
        detail: String,
    },

    /// More than one item on the board carries the business key.
    #[error("board {board_id} has {} items with key '{key}': {}", item_ids.len(), join_ids(item_ids))]
    AmbiguousItem {
        board_id: BoardId,
        key: String,
        item_ids: Vec<ItemId>,
    },

    /// Transient failure talking to the board API (timeout, network,
    /// throttling, 5xx).
    #[error("transport error: {0}")]
    Transport(#[source] MondayClientError),

    /// The record was rejected before reaching the engine.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The board API refused a lookup for a non-transient reason.
    #[error("lookup failed: {0}")]
    LookupFailed(#[source] MondayClientError),

    /// The board API refused the mutation.
    #[error("mutation rejected: {0}")]
    MutationRejected(#[source] MondayClientError),

    /// The task running the record panicked or was cancelled.
    #[error("task aborted: {0}")]
    Aborted(String),
}

impl ReconcileError {
    /// Classify an error from a query call.
    pub(crate) fn lookup(err: MondayClientError) -> Self {
        if err.is_retryable() {
            Self::Transport(err)
        } else {
            Self::LookupFailed(err)
        }
    }

    /// Classify an error from a mutation call.
    pub(crate) fn mutation(err: MondayClientError) -> Self {
        if err.is_retryable() {
            Self::Transport(err)
        } else {
            Self::MutationRejected(err)
        }
    }

    /// Whether re-running the record's pipeline may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the record should be reported as skipped rather than failed.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Retryable for ReconcileError {
    fn is_retryable(&self) -> bool {
        ReconcileError::is_retryable(self)
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Transport(e) => e.retry_after_secs(),
            _ => None,
        }
    }
}

fn join_ids(ids: &[ItemId]) -> String {
    ids.iter()
        .map(ItemId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
