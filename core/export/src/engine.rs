//! Export engine: composes registry, document-store, and vault reads into
//! the five export artifact shapes.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use docuvault_common::{Error, MemberId, Result};
use docuvault_records::{AdminDirectory, Database, DocumentStore, MemberRegistry};
use docuvault_storage::{ByteStream, FileVault};

use crate::archive::{stream_archive, ArchiveEntry};
use crate::snapshot::RawSnapshot;

/// Archive folder holding the vault files in files/full bundles.
const VAULT_FOLDER: &str = "uploads";

/// Archive entry name for the storage backend file in the full bundle.
const STORAGE_FILE_ENTRY: &str = "database.sqlite";

/// Read-only composition of the record store and the file vault.
#[derive(Clone)]
pub struct ExportEngine {
    db: Arc<Database>,
    registry: MemberRegistry,
    documents: DocumentStore,
    admins: AdminDirectory,
    vault: Arc<FileVault>,
}

impl ExportEngine {
    pub fn new(db: Arc<Database>, vault: Arc<FileVault>) -> Self {
        Self {
            registry: MemberRegistry::new(db.clone()),
            documents: DocumentStore::new(db.clone(), vault.clone()),
            admins: AdminDirectory::new(db.clone()),
            db,
            vault,
        }
    }

    /// Snapshot of all records, tagged with the export timestamp.
    ///
    /// Admin accounts are read through their secret-free summary type.
    pub fn raw_snapshot(&self) -> Result<RawSnapshot> {
        let snapshot = RawSnapshot {
            export_date: Utc::now(),
            members: self.registry.list()?,
            documents: self.documents.list_all()?,
            admins: self.admins.list_public()?,
        };

        info!(
            members = snapshot.members.len(),
            documents = snapshot.documents.len(),
            admins = snapshot.admins.len(),
            "Raw snapshot assembled"
        );
        Ok(snapshot)
    }

    /// The storage backend file, verbatim, as a chunked stream.
    ///
    /// # Errors
    /// - `NotFound` if the record store is not file-based or the file is
    ///   absent.
    pub async fn storage_file(&self) -> Result<ByteStream> {
        let path = self
            .db
            .storage_file()
            .ok_or_else(|| Error::NotFound("Storage backend is not file-based".to_string()))?;

        open_stream(path).await
    }

    /// Compressed archive of every file under the vault root.
    pub async fn files_archive(&self) -> Result<ByteStream> {
        let entries = self.vault_entries().await?;
        info!(entries = entries.len(), "Building files archive");
        stream_archive(entries).await
    }

    /// Files archive plus the storage backend file, when present.
    pub async fn full_bundle(&self) -> Result<ByteStream> {
        let mut entries = Vec::new();

        if let Some(path) = self.db.storage_file() {
            entries.push(ArchiveEntry {
                name: STORAGE_FILE_ENTRY.to_string(),
                source: path.to_path_buf(),
            });
        }
        entries.extend(self.vault_entries().await?);

        info!(entries = entries.len(), "Building full bundle");
        stream_archive(entries).await
    }

    /// Bundle of one member's documents, each renamed to its doc type.
    ///
    /// Documents sharing a doc type shadow one another at extraction;
    /// later entries win.
    ///
    /// # Errors
    /// - `NotFound` if the member does not exist or owns no documents.
    pub async fn member_bundle(&self, member_id: MemberId) -> Result<ByteStream> {
        self.registry.get(member_id)?;

        let documents = self.documents.list_for_member(member_id)?;
        if documents.is_empty() {
            return Err(Error::NotFound(format!(
                "No documents found for member {member_id}"
            )));
        }

        // Documents sharing a name: the later one in iteration order wins.
        let mut entries: Vec<ArchiveEntry> = Vec::new();
        for doc in &documents {
            let name = format!("{}{}", doc.doc_type, extension_of(&doc.file_path));
            let source = self.vault.root().join(&doc.file_path);
            match entries.iter_mut().find(|e| e.name == name) {
                Some(existing) => existing.source = source,
                None => entries.push(ArchiveEntry { name, source }),
            }
        }

        info!(member = %member_id, entries = entries.len(), "Building member bundle");
        stream_archive(entries).await
    }

    async fn vault_entries(&self) -> Result<Vec<ArchiveEntry>> {
        Ok(self
            .vault
            .list()
            .await?
            .into_iter()
            .map(|name| ArchiveEntry {
                source: self.vault.root().join(&name),
                name: format!("{VAULT_FOLDER}/{name}"),
            })
            .collect())
    }
}

/// Dotted extension of a stored path, empty when there is none.
fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

async fn open_stream(path: &Path) -> Result<ByteStream> {
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!(
                "Storage file not found: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let stream = ReaderStream::new(file).map(|chunk| chunk.map_err(Error::from));
    Ok(Box::pin(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuvault_records::MemberAttrs;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        engine: ExportEngine,
        registry: MemberRegistry,
        documents: DocumentStore,
        vault: Arc<FileVault>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let db = Arc::new(Database::open(temp.path().join("database.sqlite")).unwrap());
        let vault = Arc::new(FileVault::open(temp.path().join("uploads")).unwrap());
        Fixture {
            engine: ExportEngine::new(db.clone(), vault.clone()),
            registry: MemberRegistry::new(db.clone()),
            documents: DocumentStore::new(db.clone(), vault.clone()),
            vault,
            _temp: temp,
        }
    }

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_raw_snapshot_excludes_admin_secrets() {
        let fx = fixture();
        AdminDirectory::new(fx.engine.db.clone())
            .ensure_default("admin", "admin123")
            .unwrap();
        fx.registry.create(MemberAttrs::default()).unwrap();

        let snapshot = fx.engine.raw_snapshot().unwrap();
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.admins.len(), 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("exportDate"));
        assert!(!json.contains("password"));
        assert!(!json.contains("$argon2"));
        assert!(!json.contains("securityAnswer"));
    }

    #[tokio::test]
    async fn test_storage_file_streams_database_bytes() {
        let fx = fixture();
        let bytes = collect(fx.engine.storage_file().await.unwrap()).await;
        // SQLite database header magic.
        assert!(bytes.starts_with(b"SQLite format 3\0"));
    }

    #[tokio::test]
    async fn test_storage_file_not_found_for_memory_backend() {
        let temp = TempDir::new().unwrap();
        let db = Arc::new(Database::in_memory().unwrap());
        let vault = Arc::new(FileVault::open(temp.path().join("uploads")).unwrap());
        let engine = ExportEngine::new(db, vault);

        assert!(engine.storage_file().await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_files_archive_covers_vault() {
        let fx = fixture();
        let a = fx.vault.store(b"a", "a.png", "image/png").await.unwrap();
        let b = fx.vault.store(b"b", "b.pdf", "application/pdf").await.unwrap();

        let bytes = collect(fx.engine.files_archive().await.unwrap()).await;
        let names = entry_names(&bytes);
        assert_eq!(names.len(), 2);
        assert!(names.contains(&format!("uploads/{a}")));
        assert!(names.contains(&format!("uploads/{b}")));
    }

    #[tokio::test]
    async fn test_full_bundle_adds_storage_file() {
        let fx = fixture();
        let stored = fx.vault.store(b"a", "a.png", "image/png").await.unwrap();

        let bytes = collect(fx.engine.full_bundle().await.unwrap()).await;
        let names = entry_names(&bytes);
        assert!(names.contains(&"database.sqlite".to_string()));
        assert!(names.contains(&format!("uploads/{stored}")));

        // The bundled database is the backend file verbatim.
        let mut archive = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let mut db_bytes = Vec::new();
        archive
            .by_name("database.sqlite")
            .unwrap()
            .read_to_end(&mut db_bytes)
            .unwrap();
        assert!(db_bytes.starts_with(b"SQLite format 3\0"));
    }

    #[tokio::test]
    async fn test_member_bundle_renames_by_doc_type() {
        let fx = fixture();
        let member = fx.registry.create(MemberAttrs::default()).unwrap();
        let rel = fx.vault.store(b"scan", "front.png", "image/png").await.unwrap();
        fx.documents
            .create(
                member.id,
                None,
                Some("citizenship_front".to_string()),
                rel,
            )
            .unwrap();

        let bytes = collect(fx.engine.member_bundle(member.id).await.unwrap()).await;
        assert_eq!(entry_names(&bytes), vec!["citizenship_front.png"]);
    }

    #[tokio::test]
    async fn test_member_bundle_duplicate_doc_types_shadow() {
        let fx = fixture();
        let member = fx.registry.create(MemberAttrs::default()).unwrap();
        let first = fx.vault.store(b"first", "a.png", "image/png").await.unwrap();
        let second = fx.vault.store(b"second", "b.png", "image/png").await.unwrap();
        fx.documents
            .create(member.id, None, Some("photo".to_string()), second)
            .unwrap();
        fx.documents
            .create(member.id, None, Some("photo".to_string()), first)
            .unwrap();

        let bytes = collect(fx.engine.member_bundle(member.id).await.unwrap()).await;
        assert_eq!(entry_names(&bytes), vec!["photo.png"]);

        // Iteration is newest-first, so the older upload lands last and wins.
        let mut archive = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name("photo.png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "second");
    }

    #[tokio::test]
    async fn test_member_bundle_without_documents_is_not_found() {
        let fx = fixture();
        let member = fx.registry.create(MemberAttrs::default()).unwrap();

        let err = fx.engine.member_bundle(member.id).await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_member_bundle_unknown_member_is_not_found() {
        let fx = fixture();
        let err = fx.engine.member_bundle(MemberId(404)).await.err().unwrap();
        assert!(err.is_not_found());
    }
}
