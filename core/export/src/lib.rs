//! Backup/export engine for docuvault.
//!
//! Produces the five administrative export artifact shapes by composing
//! registry, document-store, and vault reads into streamed bodies:
//!
//! - raw snapshot of all records (admin secrets excluded by construction)
//! - the storage backend file verbatim
//! - a compressed archive of every vault file
//! - the full bundle (files plus storage file)
//! - a per-member document bundle
//!
//! Archive entries are opened, copied, and closed one at a time, so peak
//! memory stays independent of the total file-set size. A file that
//! vanishes between enumeration and read is skipped, never fatal.

pub mod archive;
pub mod engine;
pub mod snapshot;

pub use engine::ExportEngine;
pub use snapshot::RawSnapshot;
