//! Reconciliation configuration tables.
//!
//! Loaded from YAML. Everything the pipeline needs (mapping source, business
//! key column, field-to-column bindings, concurrency, timeouts and retry
//! policy) is passed explicitly; nothing is read from process-global state.
//!
//! ```yaml
//! mapping:
//!   type: board
//!   board_id: 1111111111
//!   project_column: text__project
//!   target_board_column: text__board
//! item_key_column: wbs__1
//! columns:
//!   - { source: wbs, column_id: wbs__1 }
//!   - { source: "amount:budget", column_id: numbers9__1, required: true }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use wbsync_monday::retry::RetryPolicy;

use crate::model::{BoardId, ProjectId};

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where project → board mappings come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingSource {
    /// A mapping board with one row per project.
    Board {
        board_id: BoardId,
        /// Column holding the external project identifier.
        project_column: String,
        /// Column holding the target board identifier.
        target_board_column: String,
    },
    /// A fixed table in the configuration file.
    Static { boards: BTreeMap<ProjectId, BoardId> },
}

/// Record field feeding a board column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldSource {
    ProjectId,
    Wbs,
    Name,
    /// A named amount, written as `amount:<name>`.
    Amount(String),
}

impl FromStr for FieldSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "project_id" => Ok(Self::ProjectId),
            "wbs" => Ok(Self::Wbs),
            "name" => Ok(Self::Name),
            other => match other.strip_prefix("amount:") {
                Some(field) if !field.trim().is_empty() => Ok(Self::Amount(field.trim().to_string())),
                _ => Err(format!(
                    "unknown field source '{other}' (expected project_id, wbs, name or amount:<name>)"
                )),
            },
        }
    }
}

impl TryFrom<String> for FieldSource {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectId => f.write_str("project_id"),
            Self::Wbs => f.write_str("wbs"),
            Self::Name => f.write_str("name"),
            Self::Amount(field) => write!(f, "amount:{field}"),
        }
    }
}

impl From<FieldSource> for String {
    fn from(source: FieldSource) -> Self {
        source.to_string()
    }
}

/// Binding of one record field to one board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBinding {
    pub source: FieldSource,
    pub column_id: String,
    /// Reject records where the field is missing.
    #[serde(default)]
    pub required: bool,
}

impl ColumnBinding {
    pub fn new(source: FieldSource, column_id: impl Into<String>) -> Self {
        Self {
            source,
            column_id: column_id.into(),
            required: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Complete reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub mapping: MappingSource,

    /// Column on target boards holding the WBS business key.
    pub item_key_column: String,

    pub columns: Vec<ColumnBinding>,

    /// Maximum number of records reconciled concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout applied by the caller to every external call.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

impl ReconcileConfig {
    /// Config with default concurrency, timeout and retry settings.
    pub fn new(
        mapping: MappingSource,
        item_key_column: impl Into<String>,
        columns: Vec<ColumnBinding>,
    ) -> Self {
        Self {
            mapping,
            item_key_column: item_key_column.into(),
            columns,
            concurrency: DEFAULT_CONCURRENCY,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// Parse YAML text. The result is not validated.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.mapping {
            MappingSource::Board {
                project_column,
                target_board_column,
                ..
            } => {
                if project_column.trim().is_empty() || target_board_column.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "mapping board columns must not be blank".into(),
                    ));
                }
            }
            MappingSource::Static { boards } => {
                if boards.keys().any(ProjectId::is_blank) {
                    return Err(ConfigError::Invalid(
                        "static mapping contains a blank project id".into(),
                    ));
                }
            }
        }

        if self.item_key_column.trim().is_empty() {
            return Err(ConfigError::Invalid("item_key_column must not be blank".into()));
        }

        if self.columns.is_empty() {
            return Err(ConfigError::Invalid("at least one column binding is required".into()));
        }

        let mut seen = HashSet::new();
        for binding in &self.columns {
            if binding.column_id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "column binding for '{}' has a blank column_id",
                    binding.source
                )));
            }
            if !seen.insert(binding.column_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "column '{}' is bound more than once",
                    binding.column_id
                )));
            }
        }

        // Items created without their key could never be located again.
        let key_bound = self
            .columns
            .iter()
            .any(|b| b.source == FieldSource::Wbs && b.column_id == self.item_key_column);
        if !key_bound {
            return Err(ConfigError::Invalid(format!(
                "item_key_column '{}' must be bound to the wbs field",
                self.item_key_column
            )));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid("call_timeout_secs must be at least 1".into()));
        }

        Ok(())
    }
}
