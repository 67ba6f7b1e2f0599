//! Shared fixtures for CLI integration tests: a mock GraphQL endpoint and a
//! scratch directory for config and records files.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wbsync_cli::commands::sync::SyncArgs;
use wbsync_monday::config::MondayConfig;
use wiremock::matchers::{body_partial_json, body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TARGET_BOARD: &str = "1234567890";

/// Static mapping of project "123" to the target board, scenario columns.
pub const STATIC_CONFIG: &str = r#"
mapping:
  type: static
  boards:
    "123": 1234567890
item_key_column: wbs__1
columns:
  - { source: wbs, column_id: wbs__1, required: true }
  - { source: "amount:budget", column_id: numbers9__1 }
  - { source: "amount:paid", column_id: numeric8__1 }
  - { source: "amount:remaining", column_id: numeric5__1 }
concurrency: 2
call_timeout_secs: 5
retry:
  max_retries: 0
"#;

pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn monday_config(&self) -> MondayConfig {
        MondayConfig::new("test-token").with_endpoint(self.server.uri())
    }

    /// Write `content` to `name` inside the scratch directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn sync_args(&self, records_name: &str, records: &str) -> SyncArgs {
        SyncArgs {
            config: self.write("wbsync.yaml", STATIC_CONFIG),
            records: self.write(records_name, records),
            dry_run: false,
            json: false,
            concurrency: None,
        }
    }

    /// Answer item lookups for `wbs` with `items`.
    pub async fn mock_lookup(&self, wbs: &str, items: Vec<Value>) {
        Mock::given(method("POST"))
            .and(body_string_contains("items_page_by_column_values"))
            .and(body_partial_json(json!({
                "variables": {
                    "board_id": TARGET_BOARD,
                    "columns": [{ "column_id": "wbs__1", "column_values": [wbs] }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "items_page_by_column_values": { "cursor": null, "items": items } }
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept `expected` create mutations, answering with `item_id`.
    pub async fn mock_create(&self, item_id: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(body_string_contains("create_item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "create_item": { "id": item_id } }
            })))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// Accept `expected` update mutations for `item_id`.
    pub async fn mock_update(&self, item_id: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(body_string_contains("change_multiple_column_values"))
            .and(body_partial_json(json!({ "variables": { "item_id": item_id } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "change_multiple_column_values": { "id": item_id } }
            })))
            .expect(expected)
            .mount(&self.server)
            .await;
    }
}

pub fn board_item(id: &str, wbs: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Item {id}"),
        "column_values": [{ "id": "wbs__1", "type": "text", "text": wbs }]
    })
}
