//! Mutation submission.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use wbsync_monday::api::BoardApi;

use crate::call::with_timeout;
use crate::engine::Action;
use crate::error::{ReconcileError, ReconcileResult};
use crate::model::ItemId;

/// Applies decided [`Action`]s through the board API.
///
/// Each action maps to exactly one mutation call. The executor holds no
/// business logic beyond classifying the call's failure.
#[derive(Clone)]
pub struct MutationExecutor {
    api: Arc<dyn BoardApi>,
    timeout: Duration,
}

impl MutationExecutor {
    pub fn new(api: Arc<dyn BoardApi>, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    /// Submit one action and return the affected item id.
    pub async fn execute(&self, action: &Action) -> ReconcileResult<ItemId> {
        debug!(
            board_id = %action.board_id(),
            kind = %action.kind(),
            columns = action.column_values().len(),
            "Submitting mutation"
        );

        let result = match action {
            Action::Create {
                board_id,
                name,
                column_values,
            } => {
                with_timeout(
                    self.timeout,
                    self.api.create_item(board_id, name, column_values),
                )
                .await
            }
            Action::Update {
                board_id,
                item_id,
                column_values,
            } => {
                with_timeout(
                    self.timeout,
                    self.api.update_item(board_id, item_id, column_values),
                )
                .await
            }
        };

        let item_id = result.map_err(ReconcileError::mutation)?;
        info!(
            board_id = %action.board_id(),
            item_id = %item_id,
            kind = %action.kind(),
            "Mutation applied"
        );
        Ok(item_id)
    }

    /// Submit independent actions concurrently.
    ///
    /// Results are returned in input order; one failure does not affect the
    /// others.
    pub async fn execute_all(&self, actions: Vec<Action>) -> Vec<ReconcileResult<ItemId>> {
        let total = actions.len();
        let mut tasks = JoinSet::new();
        for (index, action) in actions.into_iter().enumerate() {
            let executor = self.clone();
            tasks.spawn(async move { (index, executor.execute(&action).await) });
        }

        let mut slots: Vec<Option<ReconcileResult<ItemId>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "Mutation task aborted"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(ReconcileError::Aborted("mutation task did not complete".into()))
                })
            })
            .collect()
    }
}
