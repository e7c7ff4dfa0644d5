//! Input records and header normalization.
//!
//! Spreadsheet headers arrive with inconsistent casing and stray whitespace
//! ("Owner 1", " owner 1 ", "OWNER 1"). [`InputRecord::normalize`] folds them
//! into a canonical lower-cased key space once, so the owner resolver never
//! has to deal with header quirks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single cell value as read from tabular input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Empty cell
    #[default]
    Missing,
    /// Native boolean cell
    Bool(bool),
    /// Numeric cell
    Number(f64),
    /// Text cell
    Text(String),
}

impl FieldValue {
    /// Build a text value, mapping blank strings to `Missing`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    /// True for empty cells, blank text and NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) => false,
        }
    }

    /// Render the value as an identifier string.
    ///
    /// Integral numbers are printed without a fractional part so that a
    /// spreadsheet ID of `7.0` and a CSV ID of `"7"` checkpoint identically.
    pub fn as_id(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Self::Missing => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
        }
    }

    /// Text content, if this is a non-blank text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Spreadsheet-style truthiness: native `true`, or one of
    /// `true`/`yes`/`y`/`1`/`t` in any case.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n == 1.0,
            Self::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "t"
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One row of source data, keyed by the raw header names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Zero-based row position in the input.
    pub position: usize,

    /// Raw header name to cell value, in column order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
}

impl InputRecord {
    /// Create an empty record at a row position.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            fields: IndexMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, header: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(header.into(), value.into());
        self
    }

    /// Fold headers into canonical form (trimmed, lower-cased).
    ///
    /// When two headers collapse to the same key the first column wins.
    pub fn normalize(&self) -> NormalizedRecord {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (header, value) in &self.fields {
            fields
                .entry(canonical_header(header))
                .or_insert_with(|| value.clone());
        }
        NormalizedRecord {
            position: self.position,
            fields,
        }
    }
}

/// An input record with canonical header keys.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub position: usize,
    fields: IndexMap<String, FieldValue>,
}

impl NormalizedRecord {
    /// Case- and whitespace-insensitive field lookup.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(&canonical_header(field))
    }

    /// Resolve the record identifier.
    ///
    /// Uses the explicit ID column when present and non-missing, otherwise
    /// synthesizes `row-{position}`.
    pub fn record_id(&self, id_field: &str) -> String {
        self.get(id_field)
            .and_then(FieldValue::as_id)
            .unwrap_or_else(|| format!("row-{}", self.position))
    }
}

/// Canonical header form used for all lookups.
pub fn canonical_header(header: &str) -> String {
    header.trim().to_lowercase()
}
