//! In-memory board system for reconciliation tests.
//!
//! Stores items per board, records every mutation, and supports injected
//! failures (before or after a mutation is applied) and artificial latency. Server-side filtering is deliberately
//! looser than exact equality (case-insensitive) so callers must re-check.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use wbsync_monday::api::{BoardApi, ColumnFilter, RemoteItem};
use wbsync_monday::column::{ColumnValue, ColumnValuePayload};
use wbsync_monday::error::{MondayClientError, MondayClientResult};
use wbsync_monday::ids::{BoardId, ItemId};

/// A recorded create call.
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub board_id: BoardId,
    pub name: String,
    pub column_values: ColumnValuePayload,
}

/// A recorded update call.
#[derive(Debug, Clone)]
pub struct UpdateCall {
    pub board_id: BoardId,
    pub item_id: ItemId,
    pub column_values: ColumnValuePayload,
}

#[derive(Default)]
struct State {
    boards: HashMap<BoardId, Vec<RemoteItem>>,
    next_id: u64,
    queries: usize,
    creates: Vec<CreateCall>,
    updates: Vec<UpdateCall>,
    query_failures: VecDeque<MondayClientError>,
    mutation_failures: VecDeque<MondayClientError>,
    lost_responses: VecDeque<MondayClientError>,
}

pub struct FakeBoard {
    state: Mutex<State>,
    query_delay: Duration,
}

impl Default for FakeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBoard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 9_000_000_000,
                ..State::default()
            }),
            query_delay: Duration::ZERO,
        }
    }

    /// Delay every query, widening the window between lookup and mutation.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Seed an item with text cells.
    pub fn add_item(&self, board_id: &BoardId, item_id: u64, name: &str, cells: &[(&str, &str)]) {
        let column_values: BTreeMap<String, ColumnValue> = cells
            .iter()
            .map(|(column, text)| (column.to_string(), ColumnValue::from(*text)))
            .collect();
        self.state()
            .boards
            .entry(board_id.clone())
            .or_default()
            .push(RemoteItem {
                id: ItemId::from(item_id),
                name: name.to_string(),
                column_values,
            });
    }

    /// Fail the next query with `error`. Queue several to fail repeatedly.
    pub fn fail_next_query(&self, error: MondayClientError) {
        self.state().query_failures.push_back(error);
    }

    /// Fail the next mutation with `error`.
    pub fn fail_next_mutation(&self, error: MondayClientError) {
        self.state().mutation_failures.push_back(error);
    }

    /// Apply the next mutation, then fail it with `error` as if the
    /// response never arrived.
    pub fn lose_next_mutation_response(&self, error: MondayClientError) {
        self.state().lost_responses.push_back(error);
    }

    pub fn items(&self, board_id: &BoardId) -> Vec<RemoteItem> {
        self.state().boards.get(board_id).cloned().unwrap_or_default()
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.state().creates.clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.state().updates.clone()
    }

    pub fn mutation_count(&self) -> usize {
        let state = self.state();
        state.creates.len() + state.updates.len()
    }

    pub fn query_count(&self) -> usize {
        self.state().queries
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn loosely_matches(item: &RemoteItem, filters: &[ColumnFilter]) -> bool {
    filters.iter().all(|filter| {
        let text = item.column_text(&filter.column_id).unwrap_or_default();
        filter
            .column_values
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(&text))
    })
}

#[async_trait]
impl BoardApi for FakeBoard {
    async fn query_items(
        &self,
        board_id: &BoardId,
        filters: &[ColumnFilter],
    ) -> MondayClientResult<Vec<RemoteItem>> {
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }

        let mut state = self.state();
        state.queries += 1;
        if let Some(error) = state.query_failures.pop_front() {
            return Err(error);
        }
        Ok(state
            .boards
            .get(board_id)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| loosely_matches(item, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_item(
        &self,
        board_id: &BoardId,
        item_name: &str,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId> {
        let mut state = self.state();
        if let Some(error) = state.mutation_failures.pop_front() {
            return Err(error);
        }

        state.next_id += 1;
        let id = ItemId::from(state.next_id);
        let cells = column_values
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();
        state
            .boards
            .entry(board_id.clone())
            .or_default()
            .push(RemoteItem {
                id: id.clone(),
                name: item_name.to_string(),
                column_values: cells,
            });
        state.creates.push(CreateCall {
            board_id: board_id.clone(),
            name: item_name.to_string(),
            column_values: column_values.clone(),
        });
        if let Some(error) = state.lost_responses.pop_front() {
            return Err(error);
        }
        Ok(id)
    }

    async fn update_item(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId> {
        let mut state = self.state();
        if let Some(error) = state.mutation_failures.pop_front() {
            return Err(error);
        }

        let item = state
            .boards
            .get_mut(board_id)
            .and_then(|items| items.iter_mut().find(|item| &item.id == item_id))
            .ok_or_else(|| MondayClientError::GraphQl {
                code: Some("InvalidItemIdException".into()),
                message: format!("item {item_id} not found"),
            })?;
        for (column, value) in column_values.iter() {
            item.column_values.insert(column.to_string(), value.clone());
        }

        state.updates.push(UpdateCall {
            board_id: board_id.clone(),
            item_id: item_id.clone(),
            column_values: column_values.clone(),
        });
        if let Some(error) = state.lost_responses.pop_front() {
            return Err(error);
        }
        Ok(item_id.clone())
    }
}
