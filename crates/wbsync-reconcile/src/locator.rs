//! Business-key item lookup on a target board.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use wbsync_monday::api::{BoardApi, ColumnFilter};

use crate::call::with_timeout;
use crate::error::{ReconcileError, ReconcileResult};
use crate::model::{BoardId, BoardItem};

/// Finds the item carrying a business key in a fixed key column.
pub struct ItemLocator {
    api: Arc<dyn BoardApi>,
    key_column: String,
    timeout: Duration,
}

impl ItemLocator {
    pub fn new(api: Arc<dyn BoardApi>, key_column: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api,
            key_column: key_column.into(),
            timeout,
        }
    }

    /// Column holding the business key.
    #[must_use]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Find the item on `board_id` whose key column equals `key` exactly.
    ///
    /// `Ok(None)` means the record should be created. Two or more matches is
    /// [`ReconcileError::AmbiguousItem`].
    pub async fn find(&self, board_id: &BoardId, key: &str) -> ReconcileResult<Option<BoardItem>> {
        let filters = [ColumnFilter::equals(&self.key_column, key)];
        let items = with_timeout(self.timeout, self.api.query_items(board_id, &filters))
            .await
            .map_err(ReconcileError::lookup)?;

        let mut matches: Vec<BoardItem> = items
            .into_iter()
            .map(BoardItem::from)
            .filter(|item| item.column_text(&self.key_column).as_deref() == Some(key))
            .collect();

        debug!(board_id = %board_id, key, matches = matches.len(), "Located items by key");

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => Err(ReconcileError::AmbiguousItem {
                board_id: board_id.clone(),
                key: key.to_string(),
                item_ids: matches.into_iter().map(|item| item.id).collect(),
            }),
        }
    }
}
