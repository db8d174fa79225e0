//! sqlogging-core: severity-filtered structured logging into a SQLite table.
//!
//! A [`Logger`] owns one single-file database and one table in it. Columns are
//! declared once at creation; each write supplies any subset of them by name
//! and lands as exactly one row, durable on return. Writes below the logger's
//! [`Level`] are dropped.

pub mod error;
pub mod logger;
pub mod models;
pub mod schema;
pub mod storage;

pub use error::{Result, SqlogError};
pub use logger::{create_logger, open_logger, Logger, Row};
pub use models::{Level, LoggerConfig, Value};
pub use schema::Schema;
