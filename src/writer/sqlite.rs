use rusqlite::{ffi, Connection, ErrorCode};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{ImportError, Result};
use crate::parser::Payload;
use crate::schema::{DependencyResolver, STAGING_BOX_ID};

/// Result of a single INSERT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted { rowid: i64 },
    /// The row collided with a unique or primary key: already imported
    Conflict,
}

impl InsertOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, InsertOutcome::Conflict)
    }
}

/// True when SQLite rejected a statement because of a UNIQUE or PRIMARY KEY constraint
pub fn is_uniqueness_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file with foreign keys enforced
    pub fn open(db_path: &Path) -> rusqlite::Result<Self> {
        debug!(path = %db_path.display(), "opening database");
        Self::configure(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create every table and index that does not exist yet, then seed the staging box
    pub fn create_schema(&self) -> Result<()> {
        let tables = DependencyResolver::new()
            .creation_order()
            .map_err(ImportError::Schema)?;

        info!(tables = tables.len(), "creating schema");

        for schema in tables {
            self.conn.execute(&generate_create_table(schema), [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO box (box_id, room, freezer, freezer_loc)
             VALUES (?1, 'staging', NULL, NULL)",
            [STAGING_BOX_ID],
        )?;

        Ok(())
    }

    /// Insert one payload; uniqueness violations come back as [`InsertOutcome::Conflict`]
    pub fn insert(&self, payload: &Payload) -> rusqlite::Result<InsertOutcome> {
        let mut stmt = self.conn.prepare_cached(&payload.insert_sql())?;

        for (idx, value) in payload.values().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }

        match stmt.raw_execute() {
            Ok(_) => Ok(InsertOutcome::Inserted {
                rowid: self.conn.last_insert_rowid(),
            }),
            Err(err) if is_uniqueness_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err),
        }
    }

    /// Row count for a table
    pub fn count(&self, table: &str) -> rusqlite::Result<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{BOX, FLY, VILLAGE};

    fn database() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_schema().unwrap();
        db
    }

    fn village(code: &str, name: &str) -> Payload {
        Payload::new(&VILLAGE)
            .set("village_id", code)
            .set("village_name", name)
    }

    #[test]
    fn test_create_schema_is_idempotent_and_seeds_staging_box() {
        let db = database();
        db.create_schema().unwrap();

        assert_eq!(db.count("box").unwrap(), 1);
        let room: String = db
            .connection()
            .query_row("SELECT room FROM box WHERE box_id = -1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(room, "staging");
    }

    #[test]
    fn test_duplicate_key_is_a_conflict() {
        let db = database();

        assert!(matches!(
            db.insert(&village("OCA", "Ocaya")).unwrap(),
            InsertOutcome::Inserted { .. }
        ));
        assert_eq!(db.insert(&village("OCA", "Ocaya")).unwrap(), InsertOutcome::Conflict);
        // Same name under another code hits the unique index
        assert_eq!(db.insert(&village("OCY", "Ocaya")).unwrap(), InsertOutcome::Conflict);
        assert_eq!(db.count("village").unwrap(), 1);
    }

    #[test]
    fn test_other_constraint_failures_are_errors() {
        let db = database();

        // Unknown village violates the foreign key
        let fly = Payload::new(&FLY)
            .set("fly_code", "OCA-1")
            .set("village_name", "Nowhere")
            .set("gps_coords", "1:2");
        let err = db.insert(&fly).unwrap_err();
        assert!(!is_uniqueness_violation(&err));

        // Missing NOT NULL column
        let err = db.insert(&Payload::new(&VILLAGE).set("village_id", "X")).unwrap_err();
        assert!(!is_uniqueness_violation(&err));
    }

    #[test]
    fn test_insert_returns_rowid() {
        let db = database();
        let outcome = db.insert(&Payload::new(&BOX).set("room", "Lab 2")).unwrap();
        match outcome {
            InsertOutcome::Inserted { rowid } => assert_ne!(rowid, STAGING_BOX_ID),
            other => panic!("unexpected {:?}", other),
        }
    }
}
