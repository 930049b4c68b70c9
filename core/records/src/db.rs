//! Embedded SQLite database behind the record store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use docuvault_common::{Error, Result};

/// Shared handle to the embedded database.
///
/// One connection behind a mutex; every operation is a short statement or
/// transaction. When opened from a file, the path doubles as the payload of
/// the storage-file snapshot export.
pub struct Database {
    conn: Mutex<Connection>,
    file_path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file and run schema setup.
    ///
    /// # Postconditions
    /// - All tables exist; opening an already-initialized file is a no-op.
    ///
    /// # Errors
    /// - File cannot be opened or schema setup fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(db_err)?;
        init_schema(&conn)?;

        info!(path = %path.display(), "Record database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            file_path: Some(path),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            file_path: None,
        })
    }

    /// Path of the backing file, when the database is file-based.
    pub fn storage_file(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Run a closure against the connection under the lock.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::Internal("database lock poisoned".to_string()))?;
        f(&conn).map_err(db_err)
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            custom_id TEXT,
            name TEXT,
            email TEXT,
            address TEXT,
            phone TEXT,
            pan_number TEXT,
            citizenship_number TEXT,
            nid_number TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            member_id INTEGER NOT NULL REFERENCES members(id),
            title TEXT NOT NULL,
            file_path TEXT NOT NULL,
            doc_type TEXT NOT NULL DEFAULT 'other',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_member ON documents(member_id);

        CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            security_question TEXT,
            security_answer_hash TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(db_err)
}

pub(crate) fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}
