//! Flat-directory file vault.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use docuvault_common::{Error, Result};

/// Maximum accepted upload size in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 10_000_000;

/// File types accepted into the vault, matched against both the declared
/// extension and the declared content type.
pub const ALLOWED_FILE_TYPES: [&str; 5] = ["jpg", "jpeg", "png", "gif", "pdf"];

/// Chunk size for streamed reads.
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Byte stream type for vault reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Filesystem vault holding uploaded files in one flat directory.
///
/// Stored paths are bare file names relative to the vault root. The vault
/// holds no knowledge of the records that reference its files.
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    /// Open a vault rooted at the given directory.
    ///
    /// # Postconditions
    /// - Root directory exists.
    ///
    /// # Errors
    /// - Permission denied or other I/O failure creating the root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    /// The vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path against the root.
    ///
    /// Stored paths are single flat names; separators or parent components
    /// are rejected before touching the filesystem.
    fn resolve(&self, rel: &str) -> Result<PathBuf> {
        if rel.is_empty()
            || rel.contains('/')
            || rel.contains('\\')
            || rel == "."
            || rel == ".."
        {
            return Err(Error::Validation(format!("Invalid vault path: {rel}")));
        }
        Ok(self.root.join(rel))
    }

    /// Validate and store an uploaded file, returning its relative path.
    ///
    /// Both the declared file extension and the declared content type must
    /// independently match the allow-list; an allowed extension with a
    /// disallowed content type is rejected, and vice versa. Uploads over
    /// [`MAX_UPLOAD_BYTES`] are rejected. Validation happens before any
    /// write, so a rejected upload leaves nothing behind.
    ///
    /// The stored name is a fresh UUID plus the original extension.
    ///
    /// # Errors
    /// - `Validation` for a disallowed type or oversized payload.
    /// - I/O failure writing the file.
    pub async fn store(
        &self,
        data: &[u8],
        original_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_FILE_TYPES.contains(&ext.as_str()) {
            return Err(Error::Validation(format!(
                "File extension not allowed: {original_name}"
            )));
        }

        let declared = content_type.to_ascii_lowercase();
        if !ALLOWED_FILE_TYPES.iter().any(|t| declared.contains(t)) {
            return Err(Error::Validation(format!(
                "Content type not allowed: {content_type}"
            )));
        }

        if data.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(Error::Validation(format!(
                "File exceeds {MAX_UPLOAD_BYTES} byte limit"
            )));
        }

        let name = format!("{}.{ext}", Uuid::new_v4().simple());
        let path = self.root.join(&name);
        fs::write(&path, data).await?;

        info!(file = %name, size = data.len(), "File stored in vault");
        Ok(name)
    }

    /// Read a stored file as a stream of bounded chunks.
    ///
    /// # Errors
    /// - `NotFound` if the path does not resolve to an existing file.
    pub async fn read(&self, rel: &str) -> Result<ByteStream> {
        let path = self.resolve(rel)?;

        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("File not found: {rel}")));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(file = %rel, "Streaming vault file");
        let stream = ReaderStream::with_capacity(file, READ_CHUNK_BYTES)
            .map(|chunk| chunk.map_err(Error::from));
        Ok(Box::pin(stream))
    }

    /// Check whether a stored path exists. Never errors; an unreadable or
    /// malformed path reads as absent.
    pub async fn exists(&self, rel: &str) -> bool {
        match self.resolve(rel) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Best-effort removal of a stored file. A missing target is success.
    ///
    /// # Errors
    /// - I/O failure other than absence.
    pub async fn delete(&self, rel: &str) -> Result<()> {
        let path = self.resolve(rel)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file = %rel, "Vault file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file = %rel, "Vault file already absent on delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Relative paths of every regular file currently under the root.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        let rel = vault
            .store(b"fake png bytes", "scan.png", "image/png")
            .await
            .unwrap();
        assert!(rel.ends_with(".png"));
        assert!(vault.exists(&rel).await);

        let data = collect(vault.read(&rel).await.unwrap()).await;
        assert_eq!(data, b"fake png bytes");
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        let err = vault
            .store(b"#!/bin/sh", "payload.sh", "image/png")
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_content_type_rejected() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        // Allowed extension, disallowed declared type: still rejected.
        let err = vault
            .store(b"bytes", "scan.png", "application/octet-stream")
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        let big = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];
        let err = vault.store(&big, "huge.png", "image/png").await.unwrap_err();
        assert!(err.is_validation());
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        let err = vault.read("nope.png").await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        vault.delete("gone.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        assert!(vault.read("../escape.png").await.err().unwrap().is_validation());
        assert!(!vault.exists("../../etc/passwd").await);
    }

    #[tokio::test]
    async fn test_list_names_stored_files() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::open(temp.path()).unwrap();

        let a = vault.store(b"a", "a.jpg", "image/jpeg").await.unwrap();
        let b = vault.store(b"b", "b.pdf", "application/pdf").await.unwrap();

        let listed = vault.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a));
        assert!(listed.contains(&b));
    }
}
