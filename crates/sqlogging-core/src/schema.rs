//! Column schema: identifier rules and the sparse field map -> positional row encoding.

use std::collections::HashMap;

use crate::error::{Result, SqlogError};
use crate::models::Value;

/// True if `s` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Double-quote an identifier for interpolation into SQL.
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_ident(name) {
        Ok(())
    } else {
        Err(SqlogError::InvalidName(name.to_string()))
    }
}

/// Columns requested at creation time must be non-empty, unique and identifier-safe.
/// Uniqueness is case-insensitive because SQLite resolves column names that way.
pub fn validate_columns(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(SqlogError::InvalidColumns("at least one column is required".into()));
    }
    let mut seen = HashMap::with_capacity(columns.len());
    for column in columns {
        if !is_valid_ident(column) {
            return Err(SqlogError::InvalidColumns(format!(
                "'{column}' is not a valid SQL identifier"
            )));
        }
        if let Some(previous) = seen.insert(column.to_ascii_lowercase(), column) {
            return Err(SqlogError::InvalidColumns(format!(
                "duplicate column '{column}' (conflicts with '{previous}')"
            )));
        }
    }
    Ok(())
}

/// Ordered column list plus name -> position lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Place each supplied field at its column's position; every other slot is `Null`.
    /// A later duplicate key overwrites an earlier one.
    pub fn encode_row<I, K, V>(&self, fields: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut row = vec![Value::Null; self.columns.len()];
        for (key, value) in fields {
            let key = key.as_ref();
            let pos = self
                .position(key)
                .ok_or_else(|| SqlogError::UnknownColumn {
                    column: key.to_string(),
                })?;
            row[pos] = value.into();
        }
        Ok(row)
    }
}
