//! Error types for sqlogging-core.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlogError {
    #[error("invalid level '{0}': must be one of 'debug', 'info', 'warning', 'error', or 'critical'")]
    InvalidLevel(String),

    #[error("invalid logger name '{0}': expected a SQL identifier ([A-Za-z_][A-Za-z0-9_]*)")]
    InvalidName(String),

    #[error("invalid columns: {0}")]
    InvalidColumns(String),

    #[error("table '{table}' already exists in {}", .path.display())]
    AlreadyExists { table: String, path: PathBuf },

    #[error("table '{table}' not found in {}", .path.display())]
    NotFound { table: String, path: PathBuf },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("logger is closed")]
    Closed,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SqlogError {
    /// True for the argument-validation family (bad level, name or columns).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SqlogError::InvalidLevel(_) | SqlogError::InvalidName(_) | SqlogError::InvalidColumns(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SqlogError>;
