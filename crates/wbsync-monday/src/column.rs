//! Column values and the `column_values` wire encoding.
//!
//! Monday mutations take column values as a single JSON-encoded string
//! argument. Numbers are written unquoted, text as quoted JSON strings.
//! Keys are emitted in column-id order so that identical payloads always
//! encode to identical bytes.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Monday column type string for numeric columns.
const NUMBERS_COLUMN_TYPE: &str = "numbers";

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// Numeric value, encoded unquoted.
    Number(Decimal),
    /// Text value, encoded as a JSON string.
    Text(String),
}

impl ColumnValue {
    /// Text content of the value, as the board would display it.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Number(n) => n.normalize().to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Build a value from the `type` and `text` fields of a remote column.
    ///
    /// Returns `None` for empty cells. Numeric columns whose text does not
    /// parse as a decimal fall back to text.
    #[must_use]
    pub fn from_remote(column_type: Option<&str>, text: Option<&str>) -> Option<Self> {
        let text = text?;
        if text.is_empty() {
            return None;
        }
        if column_type == Some(NUMBERS_COLUMN_TYPE) {
            if let Ok(n) = text.trim().parse::<Decimal>() {
                return Some(Self::Number(n));
            }
        }
        Some(Self::Text(text.to_string()))
    }

    fn write_json(&self, out: &mut String) {
        match self {
            Self::Number(n) => out.push_str(&n.normalize().to_string()),
            Self::Text(s) => write_json_string(out, s),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<Decimal> for ColumnValue {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Column id → value map submitted with a create or update mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnValuePayload {
    values: BTreeMap<String, ColumnValue>,
}

impl ColumnValuePayload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column_id: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.insert(column_id, value);
        self
    }

    /// Set a column value, replacing any previous one for the same column.
    pub fn insert(&mut self, column_id: impl Into<String>, value: impl Into<ColumnValue>) {
        self.values.insert(column_id.into(), value.into());
    }

    /// Value for a column, if present.
    #[must_use]
    pub fn get(&self, column_id: &str) -> Option<&ColumnValue> {
        self.values.get(column_id)
    }

    /// Iterate over `(column_id, value)` in column-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns in the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the payload has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode to the compact JSON text passed as the `column_values` argument.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(16 * self.values.len() + 2);
        out.push('{');
        for (i, (column_id, value)) in self.values.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_json_string(&mut out, column_id);
            out.push(':');
            value.write_json(&mut out);
        }
        out.push('}');
        out
    }
}

impl FromIterator<(String, ColumnValue)> for ColumnValuePayload {
    fn from_iter<I: IntoIterator<Item = (String, ColumnValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn write_json_string(out: &mut String, s: &str) {
    // Value's Display produces a compact, correctly escaped JSON string.
    out.push_str(&serde_json::Value::String(s.to_string()).to_string());
}
