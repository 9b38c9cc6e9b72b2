//! SQLite access.
//!
//! Every request opens its own connection and runs its statements on actix's
//! blocking pool through [`Database::run`]. Write procedures open an
//! `IMMEDIATE` transaction so their existence checks and writes are not
//! interleaved with another writer.

use crate::error::ApiError;
use actix_web::web;
use common::model::entity::EntityKind;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'enumerator'))
);

CREATE TABLE IF NOT EXISTS wards (
    ward_number    INTEGER PRIMARY KEY,
    ward_area_code INTEGER NOT NULL,
    geometry       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS areas (
    id          TEXT PRIMARY KEY,
    code        INTEGER NOT NULL,
    ward_number INTEGER NOT NULL REFERENCES wards(ward_number),
    geometry    TEXT NOT NULL,
    centroid    TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'unassigned'
                CHECK (status IN ('unassigned', 'pending', 'assigned')),
    assigned_to TEXT REFERENCES users(id),
    UNIQUE (ward_number, code),
    CHECK ((status = 'unassigned') = (assigned_to IS NULL))
);

CREATE TABLE IF NOT EXISTS tokens (
    token   TEXT PRIMARY KEY,
    area_id TEXT NOT NULL REFERENCES areas(id),
    status  TEXT NOT NULL DEFAULT 'unallocated'
            CHECK (status IN ('allocated', 'unallocated'))
);

CREATE INDEX IF NOT EXISTS tokens_by_area ON tokens(area_id, status);
"#;

/// Table backing each entity kind. The workflow columns are identical across
/// the three tables.
pub fn entity_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Building => "buildings",
        EntityKind::Business => "businesses",
        EntityKind::Family => "families",
    }
}

fn entity_schema(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    id                      TEXT PRIMARY KEY,
    ward_id                 INTEGER REFERENCES wards(ward_number) ON DELETE SET NULL,
    area_id                 TEXT REFERENCES areas(id) ON DELETE SET NULL,
    enumerator_id           TEXT REFERENCES users(id) ON DELETE SET NULL,
    enumerator_name         TEXT,
    building_token          TEXT REFERENCES tokens(token) ON DELETE SET NULL,
    is_ward_valid           INTEGER NOT NULL DEFAULT 0,
    is_area_valid           INTEGER NOT NULL DEFAULT 0,
    is_enumerator_valid     INTEGER NOT NULL DEFAULT 0,
    is_building_token_valid INTEGER NOT NULL DEFAULT 0,
    tmp_ward_number         TEXT,
    tmp_area_code           TEXT,
    tmp_enumerator_id       TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS {table}_token ON {table}(building_token);
CREATE INDEX IF NOT EXISTS {table}_ward ON {table}(ward_id);
CREATE INDEX IF NOT EXISTS {table}_area ON {table}(area_id);
"#
    )
}

pub fn install_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(BASE_SCHEMA)?;
    for kind in EntityKind::ALL {
        conn.execute_batch(&entity_schema(entity_table(kind)))?;
    }
    Ok(())
}

/// Handle to the database file, shared with handlers as `web::Data`.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Switches the file to WAL and installs the schema. Called once at startup.
    pub fn initialize(&self) -> rusqlite::Result<()> {
        let conn = self.open()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        install_schema(&conn)?;
        info!("database ready at {}", self.path.display());
        Ok(())
    }

    /// Inserts the configured admin account unless a user with that id exists.
    pub fn ensure_admin(&self, id: &str, name: &str) -> rusqlite::Result<()> {
        let conn = self.open()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (id, name, role) VALUES (?1, ?2, 'admin')",
            params![id, name],
        )?;
        if inserted > 0 {
            info!("created bootstrap admin {}", id);
        }
        Ok(())
    }

    /// Runs `f` with a fresh connection on the blocking thread pool.
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        web::block(move || {
            let mut conn = db.open()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
    }
}

/// Returns true when a row with the given key exists in `table`.
pub fn row_exists(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: &dyn rusqlite::ToSql,
) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE {key_column} = ?1");
    Ok(conn
        .query_row(&sql, [key], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Maps a JSON column that failed to parse into a rusqlite conversion error.
pub fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Maps an enum column stored as text, using the enum's own parser.
pub fn enum_column<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected value '{}'", raw).into(),
        )
    })
}
