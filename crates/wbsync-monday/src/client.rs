//! Monday.com GraphQL client (reqwest-based).
//!
//! Every call is a single HTTPS POST of `{"query", "variables"}` to the
//! configured endpoint. GraphQL-level failures arrive with HTTP 200 and an
//! `errors` array (or the legacy `error_code`/`error_message` pair) and are
//! classified alongside HTTP status failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{BoardApi, ColumnFilter, RemoteItem};
use crate::auth::MondayAuth;
use crate::column::{ColumnValue, ColumnValuePayload};
use crate::config::MondayConfig;
use crate::error::{MondayClientError, MondayClientResult};
use crate::ids::{BoardId, ItemId};

const ITEMS_BY_COLUMN_VALUES_QUERY: &str = "query ($board_id: ID!, $columns: [ItemsPageByColumnValuesQuery!], $limit: Int!) { \
items_page_by_column_values(board_id: $board_id, columns: $columns, limit: $limit) { \
cursor items { id name column_values { id type text } } } }";

const NEXT_ITEMS_PAGE_QUERY: &str = "query ($cursor: String!, $limit: Int!) { \
next_items_page(cursor: $cursor, limit: $limit) { \
cursor items { id name column_values { id type text } } } }";

const CREATE_ITEM_MUTATION: &str = "mutation ($board_id: ID!, $item_name: String!, $column_values: JSON) { \
create_item(board_id: $board_id, item_name: $item_name, column_values: $column_values) { id } }";

const CHANGE_COLUMN_VALUES_MUTATION: &str = "mutation ($board_id: ID!, $item_id: ID!, $column_values: JSON!) { \
change_multiple_column_values(board_id: $board_id, item_id: $item_id, column_values: $column_values) { id } }";

const ME_QUERY: &str = "query { me { id name } }";

/// GraphQL error codes that signal throttling rather than rejection.
const RATE_LIMIT_CODES: &[&str] = &[
    "ComplexityException",
    "COMPLEXITY_BUDGET_EXHAUSTED",
    "RATE_LIMIT_EXCEEDED",
    "IP_RATE_LIMIT_EXCEEDED",
    "maxConcurrencyExceeded",
];

// ── Wire types ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
    #[serde(default)]
    extensions: Option<serde_json::Value>,
}

impl GraphQlErrorEntry {
    fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_str())
    }

    fn retry_in_seconds(&self) -> Option<u64> {
        self.extensions
            .as_ref()
            .and_then(|e| e.get("retry_in_seconds"))
            .and_then(serde_json::Value::as_u64)
    }
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    cursor: Option<String>,
    #[serde(default)]
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    name: String,
    #[serde(default)]
    column_values: Vec<WireColumnValue>,
}

#[derive(Debug, Deserialize)]
struct WireColumnValue {
    id: String,
    #[serde(rename = "type", default)]
    column_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsByColumnValuesData {
    items_page_by_column_values: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct NextItemsPageData {
    next_items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateItemData {
    create_item: IdOnly,
}

#[derive(Debug, Deserialize)]
struct ChangeColumnValuesData {
    change_multiple_column_values: IdOnly,
}

/// Authenticated account, as reported by the `me` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct MeData {
    me: AccountUser,
}

/// Result of a connectivity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Whether the endpoint answered an authenticated query.
    pub healthy: bool,
    /// Timestamp of the check.
    pub checked_at: chrono::DateTime<chrono::Utc>,
    /// Account the token belongs to, if healthy.
    pub user: Option<AccountUser>,
    /// Error message if unhealthy.
    pub error: Option<String>,
}

impl TryFrom<WireItem> for RemoteItem {
    type Error = MondayClientError;

    fn try_from(item: WireItem) -> Result<Self, Self::Error> {
        let id = ItemId::parse(&item.id).map_err(|e| MondayClientError::ParseError(e.to_string()))?;
        let column_values: BTreeMap<String, ColumnValue> = item
            .column_values
            .into_iter()
            .filter_map(|cv| {
                ColumnValue::from_remote(cv.column_type.as_deref(), cv.text.as_deref())
                    .map(|v| (cv.id, v))
            })
            .collect();
        Ok(RemoteItem {
            id,
            name: item.name,
            column_values,
        })
    }
}

/// Monday.com GraphQL client.
#[derive(Debug, Clone)]
pub struct MondayClient {
    endpoint: String,
    api_version: Option<String>,
    auth: MondayAuth,
    http_client: Client,
    timeout: Duration,
    page_limit: u32,
    max_pages: u32,
}

impl MondayClient {
    /// Create a client from configuration.
    pub fn new(config: &MondayConfig) -> MondayClientResult<Self> {
        let auth = MondayAuth::new(config.token.clone());
        if !auth.is_configured() {
            return Err(MondayClientError::InvalidConfig(
                "API token must not be empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("wbsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                MondayClientError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(config, auth, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(config: &MondayConfig, auth: MondayAuth, http_client: Client) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
            auth,
            http_client,
            timeout: config.timeout,
            page_limit: config.page_limit.max(1),
            max_pages: config.max_pages.max(1),
        }
    }

    /// The GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Return the account the token belongs to.
    pub async fn me(&self) -> MondayClientResult<AccountUser> {
        let data: MeData = self.execute(ME_QUERY, serde_json::json!({})).await?;
        Ok(data.me)
    }

    /// Perform an authenticated round trip against the endpoint.
    pub async fn health_check(&self) -> HealthCheckResult {
        let checked_at = chrono::Utc::now();
        match self.me().await {
            Ok(user) => HealthCheckResult {
                healthy: true,
                checked_at,
                user: Some(user),
                error: None,
            },
            Err(e) => HealthCheckResult {
                healthy: false,
                checked_at,
                user: None,
                error: Some(e.to_string()),
            },
        }
    }

    // ── Internal request handling ─────────────────────────────────────

    async fn execute<T, V>(&self, query: &str, variables: V) -> MondayClientResult<T>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let operation = query.split_whitespace().next().unwrap_or("query");
        debug!(endpoint = %self.endpoint, operation, "Monday GraphQL request");

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&GraphQlRequest { query, variables });
        if let Some(version) = &self.api_version {
            builder = builder.header("API-Version", version);
        }
        let builder = self.auth.apply(builder);

        let response = builder
            .send()
            .await
            .map_err(|e| MondayClientError::from_transport(&e, self.timeout))?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> MondayClientResult<T> {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| MondayClientError::from_transport(&e, self.timeout))?;

        match status {
            s if s.is_success() => {}
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(retry_after_secs = ?retry_after, "Monday API rate limited");
                return Err(MondayClientError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(MondayClientError::AuthError(format!(
                    "Authentication failed ({}): {}",
                    status.as_u16(),
                    non_empty(&body)
                )));
            }
            _ => {
                // Some GraphQL errors are returned with a 4xx status and a
                // regular error body; prefer their message when present.
                if let Ok(parsed) = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&body)
                {
                    if let Some(err) = classify_graphql_errors(&parsed, retry_after) {
                        if !status.is_server_error() {
                            return Err(err);
                        }
                    }
                }
                return Err(MondayClientError::ApiError {
                    status: status.as_u16(),
                    detail: non_empty(&body).to_string(),
                });
            }
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)
            .map_err(|e| MondayClientError::ParseError(format!("Failed to parse response: {e}")))?;

        if let Some(err) = classify_graphql_errors(&parsed, retry_after) {
            return Err(err);
        }

        parsed.data.ok_or_else(|| {
            MondayClientError::ParseError("response contained neither data nor errors".to_string())
        })
    }

    async fn fetch_items_page(
        &self,
        board_id: &BoardId,
        filters: &[ColumnFilter],
    ) -> MondayClientResult<ItemsPage> {
        let data: ItemsByColumnValuesData = self
            .execute(
                ITEMS_BY_COLUMN_VALUES_QUERY,
                serde_json::json!({
                    "board_id": board_id.as_str(),
                    "columns": filters,
                    "limit": self.page_limit,
                }),
            )
            .await?;
        Ok(data.items_page_by_column_values)
    }

    async fn fetch_next_page(&self, cursor: &str) -> MondayClientResult<ItemsPage> {
        let data: NextItemsPageData = self
            .execute(
                NEXT_ITEMS_PAGE_QUERY,
                serde_json::json!({
                    "cursor": cursor,
                    "limit": self.page_limit,
                }),
            )
            .await?;
        Ok(data.next_items_page)
    }
}

#[async_trait]
impl BoardApi for MondayClient {
    async fn query_items(
        &self,
        board_id: &BoardId,
        filters: &[ColumnFilter],
    ) -> MondayClientResult<Vec<RemoteItem>> {
        let mut page = self.fetch_items_page(board_id, filters).await?;
        let mut items = Vec::new();
        let mut pages: u32 = 1;

        loop {
            for wire in page.items {
                items.push(RemoteItem::try_from(wire)?);
            }

            let Some(cursor) = page.cursor.filter(|c| !c.is_empty()) else {
                break;
            };
            if pages >= self.max_pages {
                warn!(
                    board_id = %board_id,
                    pages,
                    fetched = items.len(),
                    "Item query exceeded the configured page maximum"
                );
                return Err(MondayClientError::ResultTruncated {
                    board_id: board_id.clone(),
                    pages,
                });
            }
            page = self.fetch_next_page(&cursor).await?;
            pages += 1;
        }

        debug!(board_id = %board_id, count = items.len(), "Fetched board items");
        Ok(items)
    }

    async fn create_item(
        &self,
        board_id: &BoardId,
        item_name: &str,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId> {
        let data: CreateItemData = self
            .execute(
                CREATE_ITEM_MUTATION,
                serde_json::json!({
                    "board_id": board_id.as_str(),
                    "item_name": item_name,
                    "column_values": column_values.encode(),
                }),
            )
            .await?;
        ItemId::parse(&data.create_item.id)
            .map_err(|e| MondayClientError::ParseError(e.to_string()))
    }

    async fn update_item(
        &self,
        board_id: &BoardId,
        item_id: &ItemId,
        column_values: &ColumnValuePayload,
    ) -> MondayClientResult<ItemId> {
        let data: ChangeColumnValuesData = self
            .execute(
                CHANGE_COLUMN_VALUES_MUTATION,
                serde_json::json!({
                    "board_id": board_id.as_str(),
                    "item_id": item_id.as_str(),
                    "column_values": column_values.encode(),
                }),
            )
            .await?;
        ItemId::parse(&data.change_multiple_column_values.id)
            .map_err(|e| MondayClientError::ParseError(e.to_string()))
    }
}

fn classify_graphql_errors<T>(
    response: &GraphQlResponse<T>,
    retry_after: Option<u64>,
) -> Option<MondayClientError> {
    if let Some(first) = response.errors.first() {
        let code = first.code().map(str::to_string);
        if code.as_deref().is_some_and(is_rate_limit_code) {
            return Some(MondayClientError::RateLimited {
                retry_after_secs: first.retry_in_seconds().or(retry_after),
            });
        }
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Some(MondayClientError::GraphQl { code, message });
    }

    if response.error_code.is_some() || response.error_message.is_some() {
        let code = response.error_code.clone();
        if code.as_deref().is_some_and(is_rate_limit_code) {
            return Some(MondayClientError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        return Some(MondayClientError::GraphQl {
            code,
            message: response
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    None
}

fn is_rate_limit_code(code: &str) -> bool {
    RATE_LIMIT_CODES.contains(&code)
}

fn non_empty(body: &str) -> &str {
    if body.trim().is_empty() {
        "<no body>"
    } else {
        body
    }
}
