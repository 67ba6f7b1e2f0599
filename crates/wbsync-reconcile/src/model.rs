//! Reconciliation data model
//!
//! A [`FinancialRecord`] is the immutable input; [`BoardMapping`] and
//! [`BoardItem`] are fetched fresh for every pipeline run and never cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use wbsync_monday::api::RemoteItem;
use wbsync_monday::column::ColumnValue;
use wbsync_monday::ids::string_or_number;
pub use wbsync_monday::ids::{BoardId, ItemId};

macro_rules! text_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a value. Surrounding whitespace is removed.
            pub fn new(value: impl Into<String>) -> Self {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.len() == value.len() {
                    Self(value)
                } else {
                    Self(trimmed.to_string())
                }
            }

            /// Borrow the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the key is empty.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                string_or_number(deserializer).map(Self::new)
            }
        }
    };
}

text_key!(
    /// External project identifier, as held by the financial system.
    ProjectId
);

text_key!(
    /// WBS element number. Used as the business key of board items.
    WbsNumber
);

/// A normalized financial record for one WBS element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub project_id: ProjectId,
    pub wbs: WbsNumber,
    pub name: String,
    /// Named numeric fields (e.g. `budget`, `paid`, `remaining`).
    #[serde(default)]
    pub amounts: BTreeMap<String, Decimal>,
}

impl FinancialRecord {
    pub fn new(
        project_id: impl Into<ProjectId>,
        wbs: impl Into<WbsNumber>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            wbs: wbs.into(),
            name: name.into(),
            amounts: BTreeMap::new(),
        }
    }

    /// Builder-style amount setter.
    #[must_use]
    pub fn with_amount(mut self, field: impl Into<String>, value: Decimal) -> Self {
        self.amounts.insert(field.into(), value);
        self
    }

    #[must_use]
    pub fn amount(&self, field: &str) -> Option<Decimal> {
        self.amounts.get(field).copied()
    }
}

/// Resolution of a project to the board holding its WBS items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardMapping {
    pub project_id: ProjectId,
    pub board_id: BoardId,
}

/// An item currently on a target board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    pub id: ItemId,
    pub name: String,
    pub column_values: BTreeMap<String, ColumnValue>,
}

impl BoardItem {
    /// Display text of a column, if the cell is non-empty.
    #[must_use]
    pub fn column_text(&self, column_id: &str) -> Option<String> {
        self.column_values
            .get(column_id)
            .map(ColumnValue::display_text)
    }
}

impl From<RemoteItem> for BoardItem {
    fn from(item: RemoteItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            column_values: item.column_values,
        }
    }
}
