//! The logger: one SQLite file, one table, level-gated synchronous writes.
//!
//! Every accepted write is a single autocommit `INSERT`, so the row is on disk
//! when the call returns. There is no buffering and no background thread.

use std::path::{Path, PathBuf};

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use crate::error::{Result, SqlogError};
use crate::models::{Level, LoggerConfig, Value};
use crate::schema::{self, Schema};
use crate::storage;

/// A row as returned by [`Logger::query`].
pub type Row = Vec<Value>;

/// Structured, severity-filtered logger backed by a single SQLite table.
///
/// The connection is owned exclusively; once [`close`](Logger::close) or
/// [`delete`](Logger::delete) succeeds every further call returns
/// [`SqlogError::Closed`].
#[derive(Debug)]
pub struct Logger {
    name: String,
    dir: PathBuf,
    path: PathBuf,
    level: Level,
    schema: Schema,
    insert_sql: String,
    conn: Option<Connection>,
}

impl Logger {
    /// Create the directory, the backing file and a fresh table.
    ///
    /// Fails with `AlreadyExists` if the table is already present in the file.
    pub fn create(config: LoggerConfig) -> Result<Self> {
        schema::validate_name(&config.name)?;
        schema::validate_columns(&config.columns)?;

        storage::ensure_dir(&config.dir)?;
        let path = storage::db_path(&config.dir, &config.name);

        // The connection is dropped (and released) on any early return below.
        let conn = storage::open_or_create(&path)?;
        if storage::table_exists(&conn, &config.name)? {
            return Err(SqlogError::AlreadyExists {
                table: config.name,
                path,
            });
        }
        storage::create_table(&conn, &config.name, &config.columns)?;
        let columns = storage::table_columns(&conn, &config.name)?;

        info!(
            logger = %config.name,
            path = %path.display(),
            level = %config.level,
            columns = columns.len(),
            "Logger created"
        );

        Ok(Self::from_parts(
            config.name,
            config.dir,
            path,
            config.level,
            columns,
            conn,
        ))
    }

    /// Attach to an existing logger. The reopened logger accepts every level;
    /// use [`open_with_level`](Logger::open_with_level) or
    /// [`set_level`](Logger::set_level) to filter.
    pub fn open(name: &str, dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_level(name, dir, Level::Debug)
    }

    pub fn open_with_level(name: &str, dir: impl AsRef<Path>, level: Level) -> Result<Self> {
        let dir = dir.as_ref();
        let path = storage::db_path(dir, name);
        let conn = storage::open_existing(&path, name)?;
        if !storage::table_exists(&conn, name)? {
            return Err(SqlogError::NotFound {
                table: name.to_string(),
                path,
            });
        }
        let columns = storage::table_columns(&conn, name)?;

        info!(logger = %name, path = %path.display(), level = %level, "Logger opened");

        Ok(Self::from_parts(
            name.to_string(),
            dir.to_path_buf(),
            path,
            level,
            columns,
            conn,
        ))
    }

    fn from_parts(
        name: String,
        dir: PathBuf,
        path: PathBuf,
        level: Level,
        columns: Vec<String>,
        conn: Connection,
    ) -> Self {
        let insert_sql = storage::insert_sql(&name, columns.len());
        Self {
            name,
            dir,
            path,
            level,
            schema: Schema::new(columns),
            insert_sql,
            conn: Some(conn),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the backing file (`dir/name.db`).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    /// Ordered column names, as stored in the table schema.
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(SqlogError::Closed)
    }

    // ─── Writing ─────────────────────────────────────────────────────────────

    /// Write one row at `level`. Below the logger's threshold this is a no-op.
    ///
    /// `fields` may name any subset of the columns; the rest are stored as NULL.
    /// A field that is not a column fails with `UnknownColumn` and nothing is written.
    pub fn log<I, K, V>(&self, level: Level, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let conn = self.conn()?;
        if level < self.level {
            debug!(logger = %self.name, %level, threshold = %self.level, "Row dropped below threshold");
            return Ok(());
        }
        let row = self.schema.encode_row(fields)?;
        let mut stmt = conn.prepare_cached(&self.insert_sql)?;
        stmt.execute(params_from_iter(row.iter()))?;
        Ok(())
    }

    pub fn debug<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.log(Level::Debug, fields)
    }

    pub fn info<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.log(Level::Info, fields)
    }

    pub fn warning<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.log(Level::Warning, fields)
    }

    pub fn error<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.log(Level::Error, fields)
    }

    pub fn critical<I, K, V>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.log(Level::Critical, fields)
    }

    // ─── Reading ─────────────────────────────────────────────────────────────

    /// Run a raw SQL statement and return every result row, fully materialized.
    pub fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.query_named(sql).map(|(_, rows)| rows)
    }

    /// Like [`query`](Logger::query), also returning the result's column names.
    pub fn query_named(&self, sql: &str) -> Result<(Vec<String>, Vec<Row>)> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = names.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Row>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((names, rows))
    }

    /// Number of rows currently in the table.
    pub fn row_count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", schema::quote_ident(&self.name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Release the connection. On-disk data is kept.
    pub fn close(&mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(SqlogError::Closed)?;
        if let Err((conn, err)) = conn.close() {
            self.conn = Some(conn);
            return Err(err.into());
        }
        debug!(logger = %self.name, "Logger closed");
        Ok(())
    }

    /// Drop the table, close the connection and remove the backing file.
    pub fn delete(&mut self) -> Result<()> {
        storage::drop_table(self.conn()?, &self.name)?;
        self.close()?;
        storage::remove_db_file(&self.path)?;
        info!(logger = %self.name, path = %self.path.display(), "Logger deleted");
        Ok(())
    }
}

/// Create a logger from plain arguments; `level` is a case-insensitive severity name.
pub fn create_logger<S: AsRef<str>>(
    name: &str,
    dir: impl AsRef<Path>,
    level: &str,
    columns: &[S],
) -> Result<Logger> {
    let level: Level = level.parse()?;
    let config = LoggerConfig::new(name, dir.as_ref())
        .with_level(level)
        .with_columns(columns.iter().map(|c| c.as_ref().to_string()));
    Logger::create(config)
}

/// Reopen a logger created earlier in `dir`.
pub fn open_logger(name: &str, dir: impl AsRef<Path>) -> Result<Logger> {
    Logger::open(name, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_rejects_bad_level_before_touching_disk() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        let err = create_logger("log", &dir, "circuital", &["ts", "data"]).unwrap_err();
        assert!(matches!(err, SqlogError::InvalidLevel(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn test_create_rejects_bad_name() {
        let tmp = TempDir::new().unwrap();
        let err = Logger::create(LoggerConfig::new("bad name", tmp.path())).unwrap_err();
        assert!(matches!(err, SqlogError::InvalidName(_)));
    }

    #[test]
    fn test_closed_logger_rejects_everything() {
        let tmp = TempDir::new().unwrap();
        let mut logger = Logger::create(LoggerConfig::new("log", tmp.path())).unwrap();
        logger.close().unwrap();

        assert!(logger.is_closed());
        assert!(matches!(logger.info([("ts", 1)]), Err(SqlogError::Closed)));
        assert!(matches!(logger.query("SELECT 1"), Err(SqlogError::Closed)));
        assert!(matches!(logger.row_count(), Err(SqlogError::Closed)));
        assert!(matches!(logger.close(), Err(SqlogError::Closed)));
        assert!(matches!(logger.delete(), Err(SqlogError::Closed)));
        assert!(logger.path().exists(), "close keeps the backing file");
    }

    #[test]
    fn test_gated_write_on_closed_logger_still_fails() {
        let tmp = TempDir::new().unwrap();
        let config = LoggerConfig::new("log", tmp.path()).with_level(Level::Critical);
        let mut logger = Logger::create(config).unwrap();
        logger.close().unwrap();
        assert!(matches!(logger.debug([("ts", 1)]), Err(SqlogError::Closed)));
    }

    #[test]
    fn test_set_level_changes_gate() {
        let tmp = TempDir::new().unwrap();
        let mut logger = Logger::create(LoggerConfig::new("log", tmp.path())).unwrap();
        logger.debug([("ts", 1)]).unwrap();
        assert_eq!(logger.row_count().unwrap(), 0);

        logger.set_level(Level::Debug);
        logger.debug([("ts", 2)]).unwrap();
        assert_eq!(logger.row_count().unwrap(), 1);
    }

    #[test]
    fn test_query_named_returns_result_columns() {
        let tmp = TempDir::new().unwrap();
        let config = LoggerConfig::new("scores", tmp.path()).with_columns(["iter", "score"]);
        let logger = Logger::create(config).unwrap();
        logger.info([("iter", Value::from(1)), ("score", Value::from(0.5))]).unwrap();

        let (names, rows) = logger
            .query_named("SELECT score, iter * 2 AS doubled FROM scores")
            .unwrap();
        assert_eq!(names, vec!["score", "doubled"]);
        assert_eq!(rows, vec![vec![Value::Real(0.5), Value::Integer(2)]]);
    }

    #[test]
    fn test_insert_statement_matches_schema_width() {
        let tmp = TempDir::new().unwrap();
        let config = LoggerConfig::new("wide", tmp.path()).with_columns(["a", "b", "c"]);
        let logger = Logger::create(config).unwrap();
        assert_eq!(logger.insert_sql, r#"INSERT INTO "wide" VALUES (?1, ?2, ?3)"#);
    }

    #[test]
    fn test_query_error_propagates() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::create(LoggerConfig::new("log", tmp.path())).unwrap();
        assert!(matches!(
            logger.query("SELEKT nonsense"),
            Err(SqlogError::Sqlite(_))
        ));
        assert!(matches!(
            logger.query("SELECT missing_column FROM log"),
            Err(SqlogError::Sqlite(_))
        ));
    }
}
