//! Streaming zip construction.
//!
//! The zip container needs a seekable writer, so archives are spooled
//! through an unnamed temporary file on a blocking thread: each entry is
//! opened, copied with a bounded buffer, and closed before the next one
//! starts. The finished spool is then handed back out as a chunked stream,
//! throttled by the consumer's read rate.

use std::fs;
use std::io::{self, Seek};
use std::path::PathBuf;

use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docuvault_common::{Error, Result};
use docuvault_storage::ByteStream;

/// Chunk size for streaming the finished archive out.
const STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// One planned archive entry: the name inside the archive and the source
/// file on disk.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub source: PathBuf,
}

/// Build a compressed archive from the planned entries and stream it.
///
/// Entries whose source has vanished since enumeration are skipped; the
/// archive is still closed well-formed.
pub async fn stream_archive(entries: Vec<ArchiveEntry>) -> Result<ByteStream> {
    let spool = tokio::task::spawn_blocking(move || build_spool(entries))
        .await
        .map_err(|e| Error::Internal(format!("Archive task failed: {e}")))??;

    let file = tokio::fs::File::from_std(spool);
    let stream = ReaderStream::with_capacity(file, STREAM_CHUNK_BYTES)
        .map(|chunk| chunk.map_err(Error::from));
    Ok(Box::pin(stream))
}

/// Write all entries into a rewound spool file, one at a time.
fn build_spool(entries: Vec<ArchiveEntry>) -> Result<fs::File> {
    let mut spool = tempfile::tempfile()?;

    {
        let mut zip = ZipWriter::new(&mut spool);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9));

        for entry in entries {
            let mut source = match fs::File::open(&entry.source) {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(
                        entry = %entry.name,
                        source = %entry.source.display(),
                        "File vanished before archiving; skipping entry"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            zip.start_file(entry.name.as_str(), options).map_err(zip_err)?;
            let copied = io::copy(&mut source, &mut zip)?;
            debug!(entry = %entry.name, bytes = copied, "Archive entry written");
        }

        zip.finish().map_err(zip_err)?;
    }

    spool.rewind()?;
    Ok(spool)
}

fn zip_err(e: zip::result::ZipError) -> Error {
    Error::Storage(format!("Archive write failed: {e}"))
}
