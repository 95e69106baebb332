//! Table model - the dataset a grid session edits.
//!
//! A table is an ordered list of column names plus a list of records
//! keyed by column name. Cell scalars mirror what the backend emits as
//! JSON: strings, numbers, and nulls. Nothing here is typed beyond
//! that; schema enforcement lives server-side.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Display stand-in for null/missing cells in filter menus.
///
/// Filters compare normalized strings, so null must map to something
/// a user can tick on and off like any other value.
pub const EMPTY_SENTINEL: &str = "(empty)";

/// A single cell scalar.
///
/// Untagged so that rows deserialize straight from the backend's
/// `[{col: value, ...}, ...]` payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view, if this cell holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String used for filter membership tests and filter menus.
    /// Null coerces to [`EMPTY_SENTINEL`].
    pub fn filter_key(&self) -> String {
        match self {
            CellValue::Null => EMPTY_SENTINEL.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }

    /// Display string for rendering. Null renders empty.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Integral floats print without a trailing `.0` so "3" the number and
/// "3" the string normalize identically in filter menus.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A record: column name -> cell scalar.
pub type Row = FxHashMap<String, CellValue>;

/// The full dataset handed to a grid session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Ordered, unique column names.
    pub headers: Vec<String>,
    /// Records in storage order. Row identity for an edit session is
    /// positional at load time; the session assigns stable ids on top.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Build a row with every header defaulted to an empty string.
    pub fn blank_row(headers: &[String]) -> Row {
        headers
            .iter()
            .map(|h| (h.clone(), CellValue::default()))
            .collect()
    }
}
