//! Cell value model shared by tables, script engines and handlers.
//!
//! Table cells and script results cross the same boundary, so both sides use
//! one closed sum type instead of an open dynamically-typed object. The
//! dispatch pipeline itself never inspects the variants; only handlers and
//! the consuming pipeline do.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell or script result.
///
/// Only `Text` cells are eligible for script dispatch; every other kind
/// passes through the decorator unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

impl CellValue {
    /// Returns the contained text if this is a textual cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Decimal(value) => write!(f, "{}", value),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// JSON interop for fixture building.
///
/// The tabular model has no nested kinds, so arrays and objects degrade to
/// their JSON text rendering.
impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => CellValue::Text(text),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    CellValue::Integer(int)
                } else if let Some(float) = number.as_f64() {
                    CellValue::Decimal(float)
                } else {
                    CellValue::Null
                }
            }
            serde_json::Value::Bool(flag) => CellValue::Bool(flag),
            serde_json::Value::Null => CellValue::Null,
            other => CellValue::Text(other.to_string()),
        }
    }
}
