//! Project → board resolution.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use wbsync_monday::api::{BoardApi, ColumnFilter};

use crate::call::with_timeout;
use crate::config::MappingSource;
use crate::error::{ReconcileError, ReconcileResult};
use crate::model::{BoardId, BoardItem, BoardMapping, ProjectId};

/// Resolves an external project identifier to its target board.
pub struct BoardMappingResolver {
    api: Arc<dyn BoardApi>,
    source: MappingSource,
    timeout: Duration,
}

impl BoardMappingResolver {
    pub fn new(api: Arc<dyn BoardApi>, source: MappingSource, timeout: Duration) -> Self {
        Self {
            api,
            source,
            timeout,
        }
    }

    /// Resolve `project_id`.
    ///
    /// Matching is exact and case-sensitive. Mapping boards are queried on
    /// every call; nothing is cached.
    pub async fn resolve(&self, project_id: &ProjectId) -> ReconcileResult<BoardMapping> {
        match &self.source {
            MappingSource::Static { boards } => boards
                .get(project_id)
                .map(|board_id| BoardMapping {
                    project_id: project_id.clone(),
                    board_id: board_id.clone(),
                })
                .ok_or_else(|| ReconcileError::NotFound {
                    project_id: project_id.clone(),
                }),
            MappingSource::Board {
                board_id,
                project_column,
                target_board_column,
            } => {
                self.resolve_from_board(project_id, board_id, project_column, target_board_column)
                    .await
            }
        }
    }

    async fn resolve_from_board(
        &self,
        project_id: &ProjectId,
        mapping_board: &BoardId,
        project_column: &str,
        target_board_column: &str,
    ) -> ReconcileResult<BoardMapping> {
        let filters = [ColumnFilter::equals(project_column, project_id.as_str())];
        let rows = with_timeout(self.timeout, self.api.query_items(mapping_board, &filters))
            .await
            .map_err(ReconcileError::lookup)?;

        let mut matches: Vec<BoardItem> = rows
            .into_iter()
            .map(BoardItem::from)
            .filter(|row| row.column_text(project_column).as_deref() == Some(project_id.as_str()))
            .collect();

        debug!(
            project_id = %project_id,
            mapping_board = %mapping_board,
            matches = matches.len(),
            "Looked up board mapping"
        );

        let row = match matches.len() {
            0 => {
                return Err(ReconcileError::NotFound {
                    project_id: project_id.clone(),
                })
            }
            1 => matches.remove(0),
            count => {
                return Err(ReconcileError::AmbiguousMapping {
                    project_id: project_id.clone(),
                    count,
                })
            }
        };

        let raw = row
            .column_text(target_board_column)
            .ok_or_else(|| ReconcileError::InvalidMapping {
                project_id: project_id.clone(),
                detail: format!("column '{target_board_column}' is empty"),
            })?;
        let board_id = BoardId::parse(&raw).map_err(|e| ReconcileError::InvalidMapping {
            project_id: project_id.clone(),
            detail: e.to_string(),
        })?;

        Ok(BoardMapping {
            project_id: project_id.clone(),
            board_id,
        })
    }
}
