//! Document store: member-to-file associations and cascade deletes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docuvault_common::{DocType, DocumentId, Error, MemberId, Result};
use docuvault_storage::FileVault;

use crate::db::Database;

const DOCUMENT_COLUMNS: &str =
    "id, member_id, title, file_path, doc_type, created_at, updated_at";

/// Association between a member and a stored file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub member_id: MemberId,
    pub title: String,
    pub file_path: String,
    pub doc_type: DocType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a single document delete.
///
/// The record is always removed; `file_removed` reports whether the backing
/// file went with it.
#[derive(Debug)]
pub struct DocumentRemoval {
    pub record: DocumentRecord,
    pub file_removed: bool,
}

/// Outcome of a member cascade delete.
///
/// Every record that existed at call time is removed; files that could not
/// be deleted are listed for the caller to retry or alert on.
#[derive(Debug, Default)]
pub struct CascadeReport {
    pub documents_removed: usize,
    pub failed_files: Vec<String>,
}

/// Store of document records, owning the cascade-delete policy.
#[derive(Clone)]
pub struct DocumentStore {
    db: Arc<Database>,
    vault: Arc<FileVault>,
}

impl DocumentStore {
    pub fn new(db: Arc<Database>, vault: Arc<FileVault>) -> Self {
        Self { db, vault }
    }

    /// Record a document for a member, pointing at an already-stored file.
    ///
    /// # Preconditions
    /// - The file at `file_path` has been durably written to the vault.
    ///
    /// # Errors
    /// - `NotFound` if the member does not exist.
    pub fn create(
        &self,
        member_id: MemberId,
        title: Option<String>,
        doc_type: Option<String>,
        file_path: String,
    ) -> Result<DocumentRecord> {
        let member_exists = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM members WHERE id = ?1)",
                [member_id.as_i64()],
                |row| row.get::<_, bool>(0),
            )
        })?;
        if !member_exists {
            return Err(Error::NotFound(format!("Member not found: {member_id}")));
        }

        // Empty titles fall back the same way missing ones do.
        let title = match title {
            Some(t) if !t.is_empty() => t,
            _ => "Document".to_string(),
        };
        let doc_type = doc_type
            .as_deref()
            .map(DocType::parse_or_other)
            .unwrap_or_default();

        let now = Utc::now();
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (member_id, title, file_path, doc_type, \
                 created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    member_id.as_i64(),
                    title,
                    file_path,
                    doc_type.as_str(),
                    now,
                    now,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(document = id, member = %member_id, doc_type = %doc_type, "Document recorded");
        self.get(DocumentId(id))
    }

    /// Fetch one document record.
    ///
    /// # Errors
    /// - `NotFound` if no such id.
    pub fn get(&self, id: DocumentId) -> Result<DocumentRecord> {
        let found = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"
            ))?;
            match stmt.query_row([id.as_i64()], document_from_row) {
                Ok(d) => Ok(Some(d)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })?;

        found.ok_or_else(|| Error::NotFound(format!("Document not found: {id}")))
    }

    /// All documents for a member, most recently created first.
    pub fn list_for_member(&self, member_id: MemberId) -> Result<Vec<DocumentRecord>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE member_id = ?1 \
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([member_id.as_i64()], document_from_row)?;
            rows.collect()
        })
    }

    /// All document records in the store (export enumeration).
    pub fn list_all(&self) -> Result<Vec<DocumentRecord>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], document_from_row)?;
            rows.collect()
        })
    }

    /// Delete one document and, best-effort, its stored file.
    ///
    /// A file-deletion failure is logged and reported in the result; the
    /// record is removed regardless. An orphaned record pointing at a
    /// missing file is worse than a stray unreferenced file.
    ///
    /// # Errors
    /// - `NotFound` if no such record.
    pub async fn delete(&self, id: DocumentId) -> Result<DocumentRemoval> {
        let record = self.get(id)?;

        let file_removed = match self.vault.delete(&record.file_path).await {
            Ok(()) => true,
            Err(e) => {
                warn!(document = %id, file = %record.file_path, error = %e,
                    "Failed to delete document file; removing record anyway");
                false
            }
        };

        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM documents WHERE id = ?1", [id.as_i64()])
        })?;

        info!(document = %id, file_removed, "Document deleted");
        Ok(DocumentRemoval {
            record,
            file_removed,
        })
    }

    /// Cascade-delete every document owned by a member.
    ///
    /// File deletions are attempted independently; the operation never
    /// aborts partway. All matching records are then removed in one
    /// statement, whatever the file outcomes were.
    pub async fn delete_all_for_member(&self, member_id: MemberId) -> Result<CascadeReport> {
        let documents = self.list_for_member(member_id)?;

        let mut failed_files = Vec::new();
        for doc in &documents {
            if let Err(e) = self.vault.delete(&doc.file_path).await {
                warn!(member = %member_id, file = %doc.file_path, error = %e,
                    "Failed to delete file during cascade");
                failed_files.push(doc.file_path.clone());
            }
        }

        let removed = self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM documents WHERE member_id = ?1",
                [member_id.as_i64()],
            )
        })?;

        Ok(CascadeReport {
            documents_removed: removed,
            failed_files,
        })
    }
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    let doc_type: String = row.get(4)?;
    Ok(DocumentRecord {
        id: DocumentId(row.get(0)?),
        member_id: MemberId(row.get(1)?),
        title: row.get(2)?,
        file_path: row.get(3)?,
        doc_type: DocType::parse_or_other(&doc_type),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
