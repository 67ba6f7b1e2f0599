//! Board API capability trait.
//!
//! The reconciliation engine only ever talks to the board system through
//! [`BoardApi`]. [`crate::client::MondayClient`] is the production
//! implementation; tests substitute in-memory fakes.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::column::{ColumnValue, ColumnValuePayload};
use crate::error::MondayClientResult;
use crate::ids::{BoardId, ItemId};

/// Equality filter on a single column, as accepted by
/// `items_page_by_column_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFilter {
    /// Column to match on.
    pub column_id: String,
    /// Accepted values (any of).
    pub column_values: Vec<String>,
}

impl ColumnFilter {
    /// Filter matching a single value.
    #[must_use]
    pub fn equals(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            column_values: vec![value.into()],
        }
    }
}

/// An item as returned by a board query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: ItemId,
    pub name: String,
    /// Non-empty column values keyed by column id.
    pub column_values: BTreeMap<String, ColumnValue>,
}

impl RemoteItem {
    /// Display text of a column, if the cell is non-empty.
    #[must_use]
    pub fn column_text(&self, column_id: &str) -> Option<String> {
        self.column_values
            .get(column_id)
            .map(ColumnValue::display_text)
    }
}

/// Query and mutation capability against a board system.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Return every item on `board_id` matching all `filters`.
    ///
    /// Server-side matching may be looser than exact equality; callers that
    /// need exact matches must re-check the returned column values.
    async fn query_items(
        &self,
        board_id: &BoardId,
        filters: &[ColumnFilter],
    ) -> MondayClientResult<Vec<RemoteItem>>;

    /// Create an item and return its identifier.
    async fn create_item(
        &self,
        board_id: &BoardId,
        item_name: &str,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId>;

    /// Overwrite the given columns of an existing item.
    async fn update_item(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId>;
}
