//! Monday.com GraphQL adapter.
//!
//! Exposes the [`api::BoardApi`] capability used by the reconciliation
//! engine, the reqwest-backed [`client::MondayClient`], typed column values
//! with their wire encoding, and a retry policy for transient failures.

pub mod api;
pub mod auth;
pub mod client;
pub mod column;
pub mod config;
pub mod error;
pub mod ids;
pub mod retry;

pub use api::{BoardApi, ColumnFilter, RemoteItem};
pub use client::{AccountUser, HealthCheckResult, MondayClient};
pub use column::{ColumnValue, ColumnValuePayload};
pub use config::{ConfigError, MondayConfig};
pub use error::{MondayClientError, MondayClientResult};
pub use ids::{BoardId, InvalidId, ItemId};
pub use retry::{RetryExhausted, RetryPolicy, Retryable};
