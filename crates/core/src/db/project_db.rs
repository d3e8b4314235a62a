use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::{BuildRecord, LaunchRecord};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed run history.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a launch record and return its row id.
    pub fn insert_launch(&self, record: &LaunchRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO launches (pass, binary, binary_hash, results_path, debug_path, input_path, exit_code, duration_ms, started_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.pass,
                record.binary,
                record.binary_hash,
                record.results_path,
                record.debug_path,
                record.input_path,
                record.exit_code,
                record.duration_ms,
                record.started_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List launches in insertion order, optionally filtered by pass name.
    pub fn list_launches(&self, pass: Option<&str>) -> DbResult<Vec<LaunchRecord>> {
        fn map_launch(row: &rusqlite::Row<'_>) -> rusqlite::Result<LaunchRecord> {
            Ok(LaunchRecord {
                pass: row.get(0)?,
                binary: row.get(1)?,
                binary_hash: row.get(2)?,
                results_path: row.get(3)?,
                debug_path: row.get(4)?,
                input_path: row.get(5)?,
                exit_code: row.get(6)?,
                duration_ms: row.get(7)?,
                started_at: row.get(8)?,
            })
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT pass, binary, binary_hash, results_path, debug_path, input_path, exit_code, duration_ms, started_at
            FROM launches
            WHERE ?1 IS NULL OR pass = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![pass], map_launch)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Insert a build record and return its row id.
    pub fn insert_build(&self, record: &BuildRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO builds (pass, variant, outcome, finished_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.pass, record.variant, record.outcome, record.finished_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all builds (ordered by id).
    pub fn list_builds(&self) -> DbResult<Vec<BuildRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT pass, variant, outcome, finished_at
            FROM builds
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BuildRecord {
                pass: row.get(0)?,
                variant: row.get(1)?,
                outcome: row.get(2)?,
                finished_at: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: launches table
/// - 2: add builds table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS launches (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                pass          TEXT NOT NULL,
                binary        TEXT NOT NULL,
                binary_hash   TEXT,
                results_path  TEXT NOT NULL,
                debug_path    TEXT NOT NULL,
                input_path    TEXT,
                exit_code     INTEGER,
                duration_ms   INTEGER NOT NULL,
                started_at    TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS builds (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                pass         TEXT NOT NULL,
                variant      TEXT NOT NULL,
                outcome      TEXT NOT NULL,
                finished_at  TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
