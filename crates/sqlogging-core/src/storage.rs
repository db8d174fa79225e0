//! Storage layer: SQLite connection and table management, file system helpers, YAML config I/O.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::error::{Result, SqlogError};
use crate::schema::quote_ident;

/// Extension appended to the logger name to form the backing file name.
pub const DB_EXTENSION: &str = "db";

// ─── Directory helpers ────────────────────────────────────────────────────────

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// `dir/name.db`
pub fn db_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{DB_EXTENSION}"))
}

/// Names of all loggers (backing files) in `dir`, sorted.
pub fn list_loggers(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(DB_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

pub fn remove_db_file(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    Ok(())
}

// ─── Connections ─────────────────────────────────────────────────────────────

/// Open the backing file, creating it if absent.
pub fn open_or_create(path: &Path) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open an existing backing file. Never creates one.
pub fn open_existing(path: &Path, table: &str) -> Result<Connection> {
    if !path.is_file() {
        return Err(SqlogError::NotFound {
            table: table.to_string(),
            path: path.to_path_buf(),
        });
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

// ─── Tables ──────────────────────────────────────────────────────────────────

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create `table` with one untyped column per entry, in order.
/// Untyped columns let SQLite pick a storage class per value.
pub fn create_table(conn: &Connection, table: &str, columns: &[String]) -> Result<()> {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!("CREATE TABLE {} ({column_list})", quote_ident(table)),
        [],
    )?;
    Ok(())
}

pub fn drop_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(&format!("DROP TABLE {}", quote_ident(table)), [])?;
    Ok(())
}

/// Column names of `table` in declaration order, read from the engine's own schema.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// `INSERT INTO "table" VALUES (?1, ..., ?n)`
pub fn insert_sql(table: &str, width: usize) -> String {
    let placeholders = (1..=width)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES ({placeholders})", quote_ident(table))
}

// ─── YAML config I/O ─────────────────────────────────────────────────────────

pub fn save_yaml<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = serde_yaml::to_string(data)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
